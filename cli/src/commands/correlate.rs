use anyhow::{Result, bail};
use openequity::{correlate, numeric_indicators};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::CorrelateArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    let schema = if args.tracts { &config.tracts } else { &config.counties };
    let table = super::load_table(cli, &args.table, schema)?;

    let indicators = if args.indicators.is_empty() {
        numeric_indicators(&table)
    } else {
        args.indicators.clone()
    };
    if indicators.is_empty() {
        bail!("[correlate] {} has no numeric indicator columns", args.table.display());
    }
    log::info!("[correlate] comparing {} indicators over {} {}s", indicators.len(), table.len(), table.geo_type());

    super::write_output(correlate(&table, &indicators)?, args.output.as_deref())
}
