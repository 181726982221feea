use std::io::Write;

use openequity::{
    AnalysisConfig, Concentration, EquityClassifier, GeoId, GeoType, PolicyData, PolicyTerms, RiskInput,
    TransportWeights, build_index, get_equity_geographies, io, rank_counties,
};

const COUNTIES: &str = "\
county_id,State,County Name,Resident Population (Thousands of Persons),Population Below Poverty Line (%),Unemployment Rate Date
01001,Alabama,Autauga County,100,10,2021-01
01003,Alabama,Baldwin County,100,50,2021-01
01005,Alabama,Barbour County,100,90,2021-01
";

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn county(id: &str) -> GeoId {
    GeoId::new(GeoType::County, id)
}

#[test]
fn poverty_alone_orders_counties() {
    let config = AnalysisConfig::default();
    let file = csv_file(COUNTIES);
    let table = io::read_table(file.path(), &config.counties).unwrap();

    let ranking = rank_counties(&RiskInput::without_policy(table), &config.risk, "Alabama").unwrap();
    let ids: Vec<&str> = ranking.rows().iter().map(|row| row.geography.geo_id.id()).collect();
    assert_eq!(ids, vec!["01005", "01003", "01001"]);
    assert_eq!(ranking.rows()[0].relative_risk, 1.0);
    assert!(ranking.rows()[1].relative_risk < 1.0);
}

#[test]
fn policy_coverage_lowers_priority() {
    let config = AnalysisConfig::default();
    let equal = io::read_csv_string(
        "county_id,State,County Name,Resident Population (Thousands of Persons),Population Below Poverty Line (%)\n\
         01001,Alabama,Autauga County,100,50\n\
         01005,Alabama,Barbour County,100,50\n",
        &config.counties,
    ).unwrap();
    let equal = openequity::FeatureTable::from_frame(equal, &config.counties).unwrap();

    let mut policy = PolicyData::new();
    policy.insert(county("01001"), PolicyTerms::new(0.0, 1.0).unwrap());
    policy.insert(county("01005"), PolicyTerms::new(1.0, 1.0).unwrap());

    let ranking = rank_counties(&RiskInput::with_policy(equal, policy), &config.risk, "policy").unwrap();
    assert!(ranking.has_priority());
    assert_eq!(ranking.rows()[0].geography.geo_id, county("01001"));
    assert_eq!(ranking.get(&county("01005")).unwrap().priority.unwrap().rank, 0.0);
}

#[test]
fn policy_file_with_an_empty_cell_ranks_without_policy() {
    let config = AnalysisConfig::default();
    let file = csv_file(COUNTIES);
    let table = io::read_table(file.path(), &config.counties).unwrap();

    let policy = io::read_csv_string(
        "county_id,State,County Name,Policy Value,Countdown\n\
         01001,Alabama,Autauga County,0.5,2\n\
         01003,Alabama,Baldwin County,,2\n\
         01005,Alabama,Barbour County,0.25,4\n",
        &config.counties,
    ).unwrap();
    let policy = openequity::FeatureTable::from_frame(policy, &config.counties).unwrap();
    let policy = PolicyData::from_table(&policy, &config.risk.policy).unwrap();
    assert_eq!(policy.len(), 2);
    assert!(policy.get(&county("01003")).is_none());

    let input = RiskInput::with_policy(table, policy);
    assert!(matches!(input, RiskInput::WithoutPolicy { .. }));
    let ranking = rank_counties(&input, &config.risk, "Alabama").unwrap();
    assert!(!ranking.has_priority());
    assert_eq!(ranking.rows()[0].geography.geo_id, county("01005"));
}

#[test]
fn correlation_matrix_from_csv() {
    let config = AnalysisConfig::default();
    let file = csv_file(COUNTIES);
    let table = io::read_table(file.path(), &config.counties).unwrap();

    let indicators = openequity::numeric_indicators(&table);
    assert!(!indicators.iter().any(|name| name == "Unemployment Rate Date"));
    let matrix = openequity::correlate(&table, &["Population Below Poverty Line (%)"]).unwrap();
    let r = matrix.column("Population Below Poverty Line (%)").unwrap().f64().unwrap().get(0).unwrap();
    assert!((r - 1.0).abs() < 1e-12);
}

#[test]
fn ranking_round_trips_through_csv() {
    let config = AnalysisConfig::default();
    let input = csv_file(COUNTIES);
    let table = io::read_table(input.path(), &config.counties).unwrap();
    let ranking = rank_counties(&RiskInput::without_policy(table), &config.risk, "Alabama").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ranking.csv");
    io::write_csv(&mut ranking.to_frame().unwrap(), &path).unwrap();

    let schema = openequity::TableSchema {
        geo_type: GeoType::County,
        id_column: "geo_id".into(),
        state_column: "State".into(),
        name_column: "Name".into(),
    };
    let reread = io::read_table(&path, &schema).unwrap();
    assert_eq!(reread.geographies()[0].geo_id.id(), "01005");
    assert_eq!(reread.indicator("Relative Risk").unwrap()[0], 1.0);
}

fn tract_csv() -> String {
    let header = "tract_id,State,Census Tract,People of Color (%),200% Below Poverty Level (%),\
        People with Disability (%),Age 19 or Under (%),Age 65 or Over (%),Limited English Proficiency (%),\
        Single Parent Family (%),Zero-Vehicle Household (%),Drive Alone Commuters (%)";
    let rows = [
        "06075010100,California,Tract 101,20,50,5,5,5,5,5,40,30",
        "06075010200,California,Tract 102,40,50,5,5,5,5,5,10,60",
        "06075010300,California,Tract 103,60,50,5,5,5,5,5,20,90",
    ];
    format!("{header}\n{}\n", rows.join("\n"))
}

#[test]
fn tract_at_the_average_is_not_concentrated() {
    let config = AnalysisConfig::default();
    let file = csv_file(&tract_csv());
    let tracts = io::read_table(file.path(), &config.tracts).unwrap();

    let equity = EquityClassifier::new(&config.equity).unwrap().classify(&tracts, 0.0).unwrap();
    let middle = equity.get(&GeoId::new(GeoType::Tract, "06075010200")).unwrap();
    assert_eq!(equity.averages()["People of Color"], 40.0);
    assert!(!middle.checks[0]);

    // Poverty is flat, so no tract clears the low-income check.
    let equity = get_equity_geographies(&tracts, &config.equity).unwrap();
    assert_eq!(equity.equity_tracts().count(), 0);
    assert!(equity.equity_averages().is_empty());
    assert_eq!(Concentration::default().coefficient(), 1.0);
}

#[test]
fn transport_index_ranks_tracts() {
    let mut config = AnalysisConfig::default();
    config.transport.weights.retain(|w| w.indicator == "Zero-Vehicle Household (%)");
    config.transport.weights.push(openequity::IndicatorWeight {
        indicator: "Drive Alone Commuters (%)".into(),
        weight: 50,
    });
    config.transport.weights[0].weight = 50;

    let file = csv_file(&tract_csv());
    let tracts = io::read_table(file.path(), &config.tracts).unwrap();
    let weights = TransportWeights::new(config.transport.weights.clone()).unwrap();
    assert!(weights.is_balanced());

    let index = build_index(&tracts, &weights).unwrap().top(2);
    assert_eq!(index.len(), 2);
    // 103: 50 * 1/3 + 50 * 1 beats 101: 50 * 1 + 0.
    assert_eq!(index.rows()[0].geography.geo_id.id(), "06075010300");
    assert_eq!(index.rows()[1].geography.geo_id.id(), "06075010100");
}
