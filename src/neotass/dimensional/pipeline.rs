use std::path::Path;

use tracing::{error, info, instrument, warn};

use crate::neotass::dimensional::config::{EtlConfig, PathConfig};
use crate::neotass::dimensional::error::{EtlError, Result};
use crate::neotass::dimensional::io::{self, excel_write};
use crate::neotass::dimensional::model::{RawTable, StarSchema};
use crate::neotass::dimensional::schema;
use crate::neotass::dimensional::tabulate::{WorkbookData, build_workbook};
use crate::neotass::dimensional::transform;

/// Runs extraction, transformation and load with the given configuration.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %config.paths.output.display())
)]
pub fn run(config: &EtlConfig) -> Result<StarSchema> {
    let calendar = config.calendar.names()?;
    let (opportunities, sellout) = extract(&config.paths)?;
    let star = transform::transform(&opportunities, &sellout, &config.columns, &calendar)?;
    let workbook = build_workbook(&star);
    check_contract(&workbook);
    load(&config.paths.output, &workbook)?;
    info!(sheet_count = workbook.tables.len(), "dimensional model saved");
    Ok(star)
}

/// Reads both sources. Both are attempted so every failure gets reported,
/// but a single failure discards both results.
#[instrument(level = "info", skip_all)]
pub fn extract(paths: &PathConfig) -> Result<(RawTable, RawTable)> {
    let opportunities = io::read_opportunities(&paths.opportunities);
    let sellout = io::read_sellout(&paths.sellout);

    match (opportunities, sellout) {
        (Ok(opportunities), Ok(sellout)) => Ok((opportunities, sellout)),
        (opportunities, sellout) => {
            let mut failures = Vec::new();
            if let Err(err) = opportunities {
                error!(path = %paths.opportunities.display(), %err, "failed to read opportunity registry");
                failures.push(format!("opportunities: {err}"));
            }
            if let Err(err) = sellout {
                error!(path = %paths.sellout.display(), %err, "failed to read sellout ledger");
                failures.push(format!("sellout: {err}"));
            }
            Err(EtlError::SourceUnavailable(failures.join("; ")))
        }
    }
}

/// Logs every departure from the relational contract. The workbook is still
/// written: the contract describes a later load, it does not gate this one.
pub fn check_contract(workbook: &WorkbookData) -> Vec<schema::Violation> {
    let violations = schema::validate(workbook, &schema::contract());
    for violation in &violations {
        warn!(%violation, "relational contract violation");
    }
    violations
}

/// Persists the workbook, reporting any failure as a load error.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn load(output: &Path, workbook: &WorkbookData) -> Result<()> {
    for table in &workbook.tables {
        info!(sheet = %table.sheet_name, rows = table.rows.len(), "saving table");
    }
    excel_write::write_workbook(output, workbook).map_err(|err| EtlError::Load {
        path: output.to_path_buf(),
        reason: err.to_string(),
    })
}
