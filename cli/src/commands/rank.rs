use anyhow::{Context, Result};
use openequity::{PolicyData, RiskInput, io, rank_counties};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::RankArgs) -> Result<()> {
    let mut config = super::load_config(cli)?;
    config.risk.cross |= args.cross;

    let table = super::load_table(cli, &args.table, &config.counties)?;
    let input = match &args.policy {
        Some(path) => {
            let policy_table = io::read_table(path, &config.counties)
                .with_context(|| format!("[rank] Failed to load policy terms from {}", path.display()))?;
            let policy = PolicyData::from_table(&policy_table, &config.risk.policy)?;
            RiskInput::with_policy(table, policy)
        }
        None => RiskInput::from_table(table, &config.risk)?,
    };

    let label = cli.state.as_deref().unwrap_or("all counties");
    let ranking = rank_counties(&input, &config.risk, label)?;
    for row in ranking.rows().iter().take(5) {
        log::debug!("[rank] {} -> {:.4}", row.geography, row.relative_risk);
    }

    super::write_output(ranking.to_frame()?, args.output.as_deref())
}
