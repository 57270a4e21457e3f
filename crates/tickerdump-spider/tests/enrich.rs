use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tickerdump_spider::fetch::Fetched;
use tickerdump_spider::stock::sec::enrich::enrich;
use tickerdump_spider::stock::sec::{CompanySource, ShareCounts, Submission, Tickers};
use tickerdump_spider::stock::Company;
use tickerdump_spider::Error;

/// Answers every company the same way, except the ones told to fail.
#[derive(Default)]
struct Fixture {
    fatal: Option<&'static str>,
    panics: Option<&'static str>,
}

#[async_trait]
impl CompanySource for Fixture {
    async fn tickers(&self) -> Fetched<Tickers> {
        Fetched::Data(Tickers::default())
    }

    async fn submission(&self, cik: &str) -> Fetched<Submission> {
        if self.fatal == Some(cik) {
            return Fetched::Fatal(Error::Config("request cannot be built".into()));
        }
        if self.panics == Some(cik) {
            panic!("submission for {cik} blew up");
        }
        Fetched::Data(Submission {
            sic: Some("3571".into()),
            entity_type: Some("operating".into()),
            ..Submission::default()
        })
    }

    async fn share_counts(&self, _cik: &str) -> Fetched<ShareCounts> {
        Fetched::Data(ShareCounts {
            basic: Some(100),
            diluted: Some(110),
        })
    }
}

fn companies(n: usize) -> Vec<Company> {
    (1..=n)
        .map(|i| Company::new(format!("{i:010}"), format!("T{i}"), format!("Test {i} Inc.")))
        .collect()
}

fn untouched<'a>(input: &'a [Company], output: &HashMap<String, Company>) -> Vec<&'a str> {
    input
        .iter()
        .filter(|company| output.get(&company.cik) == Some(*company))
        .map(|company| company.cik.as_str())
        .collect()
}

#[tokio::test]
async fn fatal_entity_falls_back_to_its_input() {
    let input = companies(5);
    let source = Arc::new(Fixture {
        fatal: Some("0000000003"),
        ..Fixture::default()
    });

    let output = enrich(source, input.clone(), 2, false).await.unwrap();

    assert_eq!(output.len(), 5);
    assert_eq!(untouched(&input, &output), vec!["0000000003"]);
    for company in input.iter().filter(|c| c.cik != "0000000003") {
        let enriched = &output[&company.cik];
        assert_eq!(enriched.sic.as_deref(), Some("3571"));
        assert_eq!(enriched.dilution_percentage, Some(10.0));
        assert_eq!(enriched.symbol, company.symbol);
    }
}

#[tokio::test]
async fn panicking_entity_falls_back_to_its_input() {
    let input = companies(5);
    let source = Arc::new(Fixture {
        panics: Some("0000000005"),
        ..Fixture::default()
    });

    let output = enrich(source, input.clone(), 2, false).await.unwrap();

    assert_eq!(output.len(), 5);
    assert_eq!(untouched(&input, &output), vec!["0000000005"]);
}

#[tokio::test]
async fn worker_count_does_not_change_the_result() {
    let input = companies(12);
    let one = enrich(Arc::new(Fixture::default()), input.clone(), 1, false)
        .await
        .unwrap();
    let many = enrich(Arc::new(Fixture::default()), input.clone(), 8, false)
        .await
        .unwrap();

    assert_eq!(one, many);
    assert!(untouched(&input, &one).is_empty());
}

#[tokio::test]
async fn absurd_worker_count_is_capped() {
    let input = companies(3);
    let output = enrich(Arc::new(Fixture::default()), input.clone(), usize::MAX, false)
        .await
        .unwrap();

    assert_eq!(output.len(), 3);
    assert!(untouched(&input, &output).is_empty());
}

#[tokio::test]
async fn nothing_to_enrich() {
    let output = enrich(Arc::new(Fixture::default()), Vec::new(), 2, false)
        .await
        .unwrap();
    assert!(output.is_empty());
}
