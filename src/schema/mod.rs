pub mod build;
pub mod ddl;
pub mod types;

pub use build::{build_schema, TEXT_TYPE};
pub use ddl::{create_table_ddl, table_name_for_object};
pub use types::ColumnSpec;
