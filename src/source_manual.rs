//! Built-in manual knowledge entries.
//!
//! Fixed reference content not found in any document: deployment options,
//! supported databases, pricing policy, and compliance certifications.
//! Kept in code so the answers to the most common questions survive an
//! otherwise empty corpus.

use crate::models::{Document, SourceType};

struct ManualEntry {
    title: &'static str,
    url: &'static str,
    content: &'static str,
}

const ENTRIES: &[ManualEntry] = &[
    ManualEntry {
        title: "Deployment Options",
        url: "/platform/deployment.html",
        content: "\
Mage Data Deployment Options:
Mage Data supports flexible deployment models to fit any enterprise architecture:
- On-Premises: Deploy within your own data center for maximum control and security. \
Supports all major operating systems and database platforms.
- Cloud: Available on AWS, Azure, and Google Cloud Platform. Fully managed cloud \
deployment with auto-scaling capabilities.
- Hybrid: Combine on-premises and cloud deployments for organizations with mixed \
infrastructure requirements.
All deployment options include full platform capabilities with no feature limitations.",
    },
    ManualEntry {
        title: "Supported Databases",
        url: "/platform/supported-databases.html",
        content: "\
Supported Databases and Data Sources:
Mage Data supports 50+ data sources including:
- Relational Databases: Oracle, SQL Server, PostgreSQL, MySQL, IBM DB2, SAP HANA, \
MariaDB, Amazon Aurora, Azure SQL
- Cloud Data Warehouses: Snowflake, Google BigQuery, Amazon Redshift, Azure Synapse
- NoSQL: MongoDB, Cassandra, DynamoDB, Couchbase
- File Systems: SMB, NFS, FTP, SFTP, Amazon S3, Azure Blob Storage, Google Cloud Storage
- SaaS Platforms: Salesforce, ServiceNow, Workday
- Big Data: Hadoop, Spark, Databricks, Apache Hive
- Other: SharePoint, OneDrive, mainframes, flat files (CSV, JSON, XML, Parquet)",
    },
    ManualEntry {
        title: "Demo and Pricing",
        url: "/contact.html",
        content: "\
Free Trial and Demo:
Mage Data offers personalized product demonstrations for enterprises interested in \
evaluating the platform. To request a demo or discuss your data security requirements, \
visit the Contact page at /contact.html or email info@magedata.ai.

For enterprise pricing, Mage Data provides custom quotes based on your specific data \
volume, number of data sources, and required capabilities. Contact the sales team for \
a tailored proposal.

Mage Data does not publish standard pricing publicly. All pricing is custom enterprise \
pricing; please contact info@magedata.ai or visit /contact.html to get a quote.",
    },
    ManualEntry {
        title: "Compliance and Regulations",
        url: "/solutions/compliance.html",
        content: "\
Compliance and Regulations:
Mage Data helps organizations automate compliance with major data protection \
regulations including GDPR, HIPAA, PCI-DSS, SOC 2, CCPA, and the EU AI Act.

Important: Mage Data provides tools and automation to help organizations meet \
compliance requirements, but this is not legal advice. Organizations should consult \
with legal professionals for specific compliance guidance.

Mage Data's platform provides automated data discovery, classification, masking, and \
monitoring capabilities that support compliance workflows across all major regulatory \
frameworks.",
    },
];

/// One document per built-in topic.
pub fn manual_entries() -> Vec<Document> {
    ENTRIES
        .iter()
        .map(|entry| Document {
            text: entry.content.to_string(),
            source_type: SourceType::Manual,
            source_name: entry.title.to_string(),
            source_url: Some(entry.url.to_string()),
        })
        .collect()
}
