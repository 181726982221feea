use anyhow::Result;
use openequity::{TransportWeights, build_index, compare_averages, get_equity_geographies};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::TransportArgs) -> Result<()> {
    let config = super::load_config(cli)?;
    let tracts = super::load_table(cli, &args.tracts, &config.tracts)?;

    let weights = TransportWeights::new(config.transport.weights.clone())?;
    let mut index = build_index(&tracts, &weights)?;

    if args.equity {
        let equity = get_equity_geographies(&tracts, &config.equity)?;
        let comparison = compare_averages(&tracts, index.indicators(), &equity)?;
        for (indicator, average) in &comparison.selection {
            match comparison.equity.get(indicator) {
                Some(equity_average) => log::info!("[transport] {indicator}: {average:.2} selection, {equity_average:.2} equity geographies"),
                None => log::info!("[transport] {indicator}: {average:.2} selection"),
            }
        }
        index = index.with_equity(&equity);
    }

    if let Some(n) = args.top.or(config.transport.top) {
        index = index.top(n);
    }

    super::write_output(index.to_frame()?, args.output.as_deref())
}
