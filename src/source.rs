// Where sheet text comes from. Fetching is outside the pipeline; this module
// only defines the seam and a file-backed implementation with the built-in
// sample sheets as the last resort.
use crate::config::Config;
use crate::error::Result;
use crate::loader::{DATE_HEADERS, MONTH_HEADER};
use crate::types::Platform;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Supplies raw CSV text for a platform's sheet.
pub trait SheetSource {
    fn fetch(&self, platform: Platform) -> Result<String>;
}

/// True when the text carries one of the header markers the parsers look for.
pub fn looks_like_sheet(text: &str) -> bool {
    text.contains(MONTH_HEADER) || DATE_HEADERS.iter().any(|h| text.contains(h))
}

/// Reads exported sheets from `data_dir`, falling back to sample data when a
/// file is missing or unrecognizable.
pub struct FileSource {
    data_dir: PathBuf,
    files: Vec<(Platform, String)>,
}

impl FileSource {
    pub fn from_config(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            files: Platform::ALL
                .iter()
                .map(|p| (*p, config.sheet_file(*p)))
                .collect(),
        }
    }

    fn path(&self, platform: Platform) -> Option<PathBuf> {
        self.files
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, f)| self.data_dir.join(f))
    }
}

impl SheetSource for FileSource {
    fn fetch(&self, platform: Platform) -> Result<String> {
        if let Some(path) = self.path(platform) {
            match std::fs::read_to_string(&path) {
                Ok(text) if looks_like_sheet(&text) => {
                    debug!("Loaded {} sheet from {}", platform, path.display());
                    return Ok(text);
                }
                Ok(_) => warn!("{} has no recognizable header", path.display()),
                Err(e) => warn!("Unable to read {}: {}", path.display(), e),
            }
        }
        warn!("Using sample data for {}", platform);
        Ok(sample_sheet(platform).to_string())
    }
}

/// Built-in sheets used when nothing better is available.
pub fn sample_sheet(platform: Platform) -> &'static str {
    match platform {
        Platform::Summary => SAMPLE_SUMMARY,
        Platform::TikTok => SAMPLE_TIKTOK,
        Platform::Facebook => SAMPLE_FACEBOOK,
    }
}

const SAMPLE_SUMMARY: &str = r#"MONTH,A1,C1,C2,C3,C4,D2,D3,L10,L3,L4,L6,L7,รวม
JAN,"2,247,990","492,753","534,724","1,333,440","2,414,897","1,830,113","3,059,788","7,517,964","16,002,452","12,772,207","7,868,953","2,025,109","59,100,390"
FEB,"16,999","11,460","11,210","23,077","63,472","15,324","44,395","186,421","564,559","319,742","181,330","43,967","1,481,956"
MAR,"0","0","0","0","0","0","0","0","0","0","0","0","0"
SUM,"2,264,989","504,213","545,934","1,356,517","2,478,369","1,845,437","3,104,183","7,704,385","16,567,011","13,091,949","8,050,283","2,069,076","60,582,346""#;

const SAMPLE_TIKTOK: &str = r#"COST TT ADS,,,,,,,,,,,,,,,
MONTH,A1,C1,C2,C3,C4,D2,D3,L10,L3,L4,L6,L7,รวม
JAN,"1,834,932","389,582","426,796","846,501","1,900,554","1,673,912","2,880,870","5,926,906","14,038,204","10,329,806","6,081,524","1,540,457","47,869,044"
FEB,"16,999","11,460","11,210","23,077","63,472","15,324","44,395","186,421","564,559","319,742","181,330","43,967","1,481,956"
SUM,"1,851,931","401,042","438,006","869,578","1,964,026","1,689,236","2,925,265","6,113,327","14,602,763","10,649,548","6,262,854","1,584,424","49,351,000"

วันที่,A1,C1,C2,C3,C4,D2,D3,L10,L3,L4,L6,L7,รวม
2026-01-01,"58,200","17,754","37,584","20,290","78,430","45,459","57,997","218,150","486,204","451,304","234,574","66,845","1,772,791"
2026-01-02,"58,200","13,230","10,198","20,398","62,655","45,449","58,000","161,727","486,696","344,006","194,743","35,553","1,490,855"
2026-01-03,"58,200","13,070","10,197","20,398","62,644","45,444","57,999","161,729","486,048","343,333","194,075","35,553","1,488,690"
2026-01-04,"58,200","12,730","10,198","20,400","62,658","45,456","57,993","161,735","486,760","343,445","194,808","35,553","1,489,936"
2026-01-05,"58,200","12,675","10,197","20,399","62,421","45,451","57,997","161,728","486,754","343,060","187,967","35,552","1,482,401""#;

const SAMPLE_FACEBOOK: &str = r#"COST FB ADS,,,,,,,,,,,,,,,
MONTH,A1,C1,C2,C3,C4,D2,D3,L10,L3,L4,L6,L7,รวม
JAN,"413,058","103,171","107,928","486,939","514,343","156,201","178,918","1,591,058","1,964,248","2,442,401","1,787,429","484,652","10,230,346"
FEB,"0","0","0","0","0","0","0","0","0","0","0","0","0"
SUM,"413,058","103,171","107,928","486,939","514,343","156,201","178,918","1,591,058","1,964,248","2,442,401","1,787,429","484,652","10,230,346"

วันที่,A1,C1,C2,C3,C4,D2,D3,L10,L3,L4,L6,L7,รวม
2026-01-01,"14,264","3,165","4,104","18,351","16,049","6,591","6,054","43,056","60,607","90,105","67,242","17,923","347,511"
2026-01-02,"13,284","3,465","5,276","15,513","16,458","6,580","6,133","40,539","57,195","86,383","63,883","16,441","331,150"
2026-01-03,"13,056","3,372","5,329","16,721","17,022","6,469","6,028","49,201","66,579","88,273","64,094","18,646","354,790"
2026-01-04,"16,082","3,715","5,214","17,043","19,004","7,535","7,112","58,718","72,453","102,546","71,955","17,725","399,102"
2026-01-05,"12,890","3,156","4,036","13,543","14,478","7,107","6,525","49,400","59,615","79,008","52,292","14,591","316,641""#;
