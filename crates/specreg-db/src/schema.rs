//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs and natural keys are stored as string record IDs. Closed
//! string sets are constrained with ASSERT.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Specifications (aggregate root)
-- =======================================================================
DEFINE TABLE specification SCHEMAFULL;
DEFINE FIELD specification_identifier ON TABLE specification TYPE string;
DEFINE FIELD specification_name ON TABLE specification TYPE string;
DEFINE FIELD sector ON TABLE specification TYPE string;
DEFINE FIELD sub_sector ON TABLE specification TYPE option<string>;
DEFINE FIELD purpose ON TABLE specification TYPE string;
DEFINE FIELD specification_version ON TABLE specification \
    TYPE option<string>;
DEFINE FIELD contact_information ON TABLE specification TYPE string;
DEFINE FIELD date_of_implementation ON TABLE specification \
    TYPE option<datetime>;
DEFINE FIELD country ON TABLE specification TYPE option<string>;
DEFINE FIELD is_country_specification ON TABLE specification TYPE bool \
    DEFAULT false;
DEFINE FIELD underlying_specification_identifier ON TABLE specification \
    TYPE option<string>;
DEFINE FIELD specification_source_link ON TABLE specification \
    TYPE option<string>;
DEFINE FIELD core_version ON TABLE specification TYPE option<string>;
DEFINE FIELD preferred_syntax ON TABLE specification TYPE option<string>;
DEFINE FIELD implementation_status ON TABLE specification \
    TYPE option<string>;
DEFINE FIELD registration_status ON TABLE specification \
    TYPE option<string> \
    ASSERT $value IS NONE OR $value IN ['Submitted', 'In Progress', \
    'Under Review', 'Verified'];
DEFINE FIELD specification_type ON TABLE specification \
    TYPE option<string>;
DEFINE FIELD conformance_level ON TABLE specification \
    TYPE option<string>;
DEFINE FIELD user_group_id ON TABLE specification TYPE option<string>;
DEFINE FIELD created_date ON TABLE specification TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD modified_date ON TABLE specification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_specification_group ON TABLE specification \
    COLUMNS user_group_id;

-- =======================================================================
-- Core elements (child of specification)
-- =======================================================================
DEFINE TABLE specification_core_element SCHEMAFULL;
DEFINE FIELD specification_id ON TABLE specification_core_element \
    TYPE string;
DEFINE FIELD business_term_id ON TABLE specification_core_element \
    TYPE string;
DEFINE FIELD cardinality ON TABLE specification_core_element TYPE string;
DEFINE FIELD usage_note ON TABLE specification_core_element \
    TYPE option<string>;
DEFINE FIELD type_of_change ON TABLE specification_core_element \
    TYPE string;
DEFINE INDEX idx_core_element_spec ON TABLE specification_core_element \
    COLUMNS specification_id;

-- =======================================================================
-- Extension elements (child of specification)
-- =======================================================================
DEFINE TABLE specification_extension_element SCHEMAFULL;
DEFINE FIELD specification_id ON TABLE specification_extension_element \
    TYPE string;
DEFINE FIELD extension_component_id ON TABLE \
    specification_extension_element TYPE string;
DEFINE FIELD business_term_id ON TABLE specification_extension_element \
    TYPE string;
DEFINE FIELD cardinality ON TABLE specification_extension_element \
    TYPE string;
DEFINE FIELD usage_note ON TABLE specification_extension_element \
    TYPE option<string>;
DEFINE FIELD justification ON TABLE specification_extension_element \
    TYPE option<string>;
DEFINE FIELD type_of_extension ON TABLE specification_extension_element \
    TYPE string;
DEFINE INDEX idx_extension_element_spec ON TABLE \
    specification_extension_element COLUMNS specification_id;

-- =======================================================================
-- Additional requirements (child of specification, natural composite
-- key: record ID is '<specification_id>/<business_term_id>')
-- =======================================================================
DEFINE TABLE additional_requirement SCHEMAFULL;
DEFINE FIELD specification_id ON TABLE additional_requirement \
    TYPE string;
DEFINE FIELD business_term_id ON TABLE additional_requirement \
    TYPE string;
DEFINE FIELD business_term_name ON TABLE additional_requirement \
    TYPE string;
DEFINE FIELD level ON TABLE additional_requirement TYPE string;
DEFINE FIELD cardinality ON TABLE additional_requirement TYPE string;
DEFINE FIELD row_pos ON TABLE additional_requirement TYPE int;
DEFINE FIELD semantic_description ON TABLE additional_requirement \
    TYPE option<string>;
DEFINE FIELD usage_note ON TABLE additional_requirement \
    TYPE option<string>;
DEFINE FIELD data_type ON TABLE additional_requirement \
    TYPE option<string>;
DEFINE FIELD business_rules ON TABLE additional_requirement \
    TYPE option<string>;
DEFINE FIELD type_of_change ON TABLE additional_requirement TYPE string;
DEFINE INDEX idx_add_req_spec ON TABLE additional_requirement \
    COLUMNS specification_id;

-- =======================================================================
-- Core Invoice Model (shared reference table, record ID = business term)
-- =======================================================================
DEFINE TABLE core_invoice_model SCHEMAFULL;
DEFINE FIELD business_term ON TABLE core_invoice_model TYPE string;
DEFINE FIELD level ON TABLE core_invoice_model TYPE string;
DEFINE FIELD cardinality ON TABLE core_invoice_model TYPE string;
DEFINE FIELD row_pos ON TABLE core_invoice_model TYPE int;
DEFINE FIELD semantic_description ON TABLE core_invoice_model \
    TYPE option<string>;
DEFINE FIELD data_type ON TABLE core_invoice_model TYPE option<string>;
DEFINE FIELD parent_id ON TABLE core_invoice_model TYPE option<string>;

-- =======================================================================
-- Extension Component Model (shared reference tables)
-- =======================================================================
DEFINE TABLE extension_component SCHEMAFULL;
DEFINE FIELD extension_component_name ON TABLE extension_component \
    TYPE string;
DEFINE FIELD description ON TABLE extension_component \
    TYPE option<string>;

DEFINE TABLE extension_component_element SCHEMAFULL;
DEFINE FIELD extension_component_id ON TABLE \
    extension_component_element TYPE string;
DEFINE FIELD business_term_id ON TABLE extension_component_element \
    TYPE string;
DEFINE FIELD business_term ON TABLE extension_component_element \
    TYPE string;
DEFINE FIELD level ON TABLE extension_component_element \
    TYPE option<string>;
DEFINE FIELD cardinality ON TABLE extension_component_element \
    TYPE option<string>;
DEFINE FIELD semantic_description ON TABLE extension_component_element \
    TYPE option<string>;
DEFINE FIELD data_type ON TABLE extension_component_element \
    TYPE option<string>;
DEFINE FIELD extension_type ON TABLE extension_component_element \
    TYPE option<string>;
DEFINE FIELD parent_id ON TABLE extension_component_element \
    TYPE option<string>;
DEFINE INDEX idx_extension_element_composite ON TABLE \
    extension_component_element \
    COLUMNS extension_component_id, business_term_id UNIQUE;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD first_name ON TABLE user TYPE option<string>;
DEFINE FIELD last_name ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['Admin', 'User'];
DEFINE FIELD user_group_id ON TABLE user TYPE option<string>;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_date ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD last_login_date ON TABLE user TYPE option<datetime>;
DEFINE FIELD refresh_token ON TABLE user TYPE option<string>;
DEFINE FIELD refresh_token_expiry ON TABLE user TYPE option<datetime>;
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;
DEFINE INDEX idx_user_group ON TABLE user COLUMNS user_group_id;

-- =======================================================================
-- User groups
-- =======================================================================
DEFINE TABLE user_group SCHEMAFULL;
DEFINE FIELD group_name ON TABLE user_group TYPE string;
DEFINE FIELD description ON TABLE user_group TYPE option<string>;
DEFINE FIELD created_date ON TABLE user_group TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_group_name ON TABLE user_group \
    COLUMNS group_name UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
