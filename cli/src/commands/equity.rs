use anyhow::Result;
use openequity::get_equity_geographies;

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::EquityArgs) -> Result<()> {
    let mut config = super::load_config(cli)?;
    if let Some(concentration) = args.concentration {
        config.equity.concentration = concentration;
    }

    let tracts = super::load_table(cli, &args.tracts, &config.tracts)?;
    let equity = get_equity_geographies(&tracts, &config.equity)?;

    for (indicator, average) in equity.averages() {
        match equity.equity_averages().get(indicator) {
            Some(equity_average) => log::info!("[equity] {indicator}: {average:.1}% selection, {equity_average:.1}% equity geographies"),
            None => log::info!("[equity] {indicator}: {average:.1}% selection"),
        }
    }

    super::write_output(equity.to_frame()?, args.output.as_deref())
}
