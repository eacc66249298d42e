use serde::{Deserialize, Serialize};

/// Round-trip metadata carried by neurons ingested from an external
/// relational-DB row, so that a future export connector can reconstruct
/// the original schema. The connector itself is out of scope (spec §1);
/// this struct is the thin interface it would populate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Provenance {
    pub column_schema: Option<serde_json::Value>,
    pub foreign_keys: Vec<String>,
    pub indexes: Vec<String>,
    pub check_constraints: Vec<String>,
    pub triggers: Vec<String>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub source_path: Option<String>,
    pub source_table: Option<String>,
}
