use anyhow::{Context, Result};
use openequity::{estimate_eviction_cost, io};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::CostArgs) -> Result<()> {
    let mut config = super::load_config(cli)?;
    if let Some(rent_type) = args.rent_type {
        config.cost.rent_type = rent_type;
    }
    if let Some(percent) = args.percent_burdened {
        config.cost.percent_burdened = percent;
    }

    let table = super::load_table(cli, &args.table, &config.counties)?;
    let rents = io::read_table(&args.rents, &config.counties)
        .with_context(|| format!("[cost] Failed to load rents from {}", args.rents.display()))?;

    let estimate = estimate_eviction_cost(&table.merge(&rents)?, &config.cost)?;
    log::info!("[cost] total monthly cost {:.0} ({} rents)", estimate.total(), estimate.rent_type());

    super::write_output(estimate.to_frame()?, args.output.as_deref())
}
