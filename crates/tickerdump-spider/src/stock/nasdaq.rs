use super::model::Stock;
use super::normalize::{normalize_header, FieldMap, Row, NASDAQ_LISTED, OTHER_LISTED};
use crate::error::Error;
use async_trait::async_trait;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use suppaftp::types::FileType;
use suppaftp::FtpStream;
use tracing::{debug, trace, warn};

pub const FTP_HOST: &str = "ftp.nasdaqtrader.com";

pub const REMOTE_DIR: &str = "/SymbolDirectory";

/// The two listing files of the symbol directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingFile {
    /// Securities listed on NYSE, NYSE American, NYSE Arca, Cboe BZX and IEX.
    OtherListed,

    /// Securities listed on the NASDAQ exchange.
    NasdaqListed,
}

impl ListingFile {
    pub const ALL: [ListingFile; 2] = [ListingFile::OtherListed, ListingFile::NasdaqListed];

    pub fn filename(&self) -> &'static str {
        match self {
            ListingFile::OtherListed => "otherlisted.txt",
            ListingFile::NasdaqListed => "nasdaqlisted.txt",
        }
    }

    pub fn field_map(&self) -> &'static FieldMap {
        match self {
            ListingFile::OtherListed => &OTHER_LISTED,
            ListingFile::NasdaqListed => &NASDAQ_LISTED,
        }
    }
}

impl std::fmt::Display for ListingFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.filename())
    }
}

/// Somewhere the raw listing files can be read from.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    async fn fetch(&self, file: ListingFile) -> Result<String, Error>;
}

/// The NASDAQ Trader FTP server, logged into anonymously.
#[derive(Debug, Clone)]
pub struct FtpDirectory {
    host: String,
    dir: String,
}

impl FtpDirectory {
    pub fn new(host: &str, dir: &str) -> Self {
        Self {
            host: host.to_string(),
            dir: dir.to_string(),
        }
    }
}

impl Default for FtpDirectory {
    fn default() -> Self {
        Self::new(FTP_HOST, REMOTE_DIR)
    }
}

#[async_trait]
impl DirectorySource for FtpDirectory {
    async fn fetch(&self, file: ListingFile) -> Result<String, Error> {
        let host = self.host.clone();
        let dir = self.dir.clone();

        // suppaftp's stream is blocking
        tokio::task::spawn_blocking(move || -> Result<String, Error> {
            debug!("downloading {file} from ftp://{host}{dir}");
            let mut ftp = FtpStream::connect(format!("{host}:21"))?;
            ftp.login("anonymous", "anonymous")?;
            ftp.cwd(&dir)?;
            ftp.transfer_type(FileType::Binary)?;
            let buffer = ftp.retr_as_buffer(file.filename())?;
            ftp.quit()?;

            let bytes = buffer.into_inner();
            trace!("{file} downloaded, {} bytes", bytes.len());
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        })
        .await?
    }
}

/// Split pipe-delimited text into rows keyed by normalized header.
///
/// Rows that the reader can't split are logged and skipped; short rows just miss columns.
pub fn read_rows(text: &str) -> Result<Vec<Row>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(
                headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect(),
            ),
            // +2: 1-based, after the header
            Err(err) => warn!("skipping unreadable directory line {}, error({err})", line + 2),
        }
    }

    Ok(rows)
}

/// Parse one listing file into stocks; malformed rows are logged and dropped.
pub fn parse(text: &str, file: ListingFile) -> Result<Vec<Stock>, Error> {
    let rows = read_rows(text)?;
    let field_map = file.field_map();

    let stocks: Vec<Stock> = rows
        .par_iter()
        .filter_map(|row| match field_map.normalize(row) {
            Ok(stock) => Some(stock),
            Err(rejection) => {
                let symbol = row.get(field_map.symbol).map(String::as_str).unwrap_or("?");
                warn!("skipping {file} row [{symbol}]: {rejection}");
                None
            }
        })
        .collect();

    debug!(
        "{file}: {} records normalized out of {} rows",
        stocks.len(),
        rows.len()
    );

    Ok(stocks)
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const NASDAQ_TXT: &str = "\
Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
AAPL|Apple Inc. - Common Stock|Q|N|N|100|N|N
MSFT|Microsoft Corporation - Common Stock|Q|N|N|100|N|N
ZXZZT|NASDAQ TEST STOCK|G|Y|N|100|N|N
|Nameless Ltd.|Q|N|N|100|N|N
File Creation Time: 1017202608:00|||||||
";

    const OTHER_TXT: &str = "\
ACT Symbol|Security Name|Exchange|CQS Symbol|ETF|Round Lot Size|Test Issue|NASDAQ Symbol
A|Agilent Technologies, Inc. Common Stock|N|A|N|100|N|A
SPY|SPDR S&P 500 ETF Trust|P|SPY|Y|100|N|SPY
BAD|No Exchange Corp||BAD|N|100|N|BAD
File Creation Time: 1017202608:00|||||||
";

    #[test]
    fn nasdaq_file_drops_malformed_rows() {
        let stocks = parse(NASDAQ_TXT, ListingFile::NasdaqListed).unwrap();

        let ids: Vec<&str> = stocks.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["AAPL:NASDAQ", "MSFT:NASDAQ", "ZXZZT:NASDAQ"]);
        assert!(stocks[2].test_issue);
    }

    #[test]
    fn other_file_requires_an_exchange() {
        let stocks = parse(OTHER_TXT, ListingFile::OtherListed).unwrap();

        let ids: Vec<&str> = stocks.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A:N", "SPY:P"]);
        assert!(stocks[1].etf);
    }

    #[test]
    fn every_output_has_its_required_fields() {
        for (text, file) in [
            (NASDAQ_TXT, ListingFile::NasdaqListed),
            (OTHER_TXT, ListingFile::OtherListed),
        ] {
            let rows = read_rows(text).unwrap();
            let stocks = parse(text, file).unwrap();
            assert!(stocks.len() <= rows.len());
            for stock in stocks {
                assert!(!stock.symbol.is_empty());
                assert!(!stock.security_name.is_empty());
                assert!(!stock.exchange.is_empty());
                assert!(stock.round_lot_size > 0);
            }
        }
    }

    #[test]
    fn headers_only() {
        let header = NASDAQ_TXT.lines().next().unwrap();
        assert!(parse(header, ListingFile::NasdaqListed).unwrap().is_empty());
    }
}
