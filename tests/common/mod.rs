#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const RAW_HEADER: &str = "Row ID,Order ID,Order Date,Ship Date,Ship Mode,Customer ID,Segment,\
Product ID,Sub-Category,Product Name,Sales,Quantity,Discount,Profit";

/// Three orders exercising ambiguous dates, dashed separators and bad numbers.
pub const SAMPLE_ROWS: &[&str] = &[
    "1,CA-2016-152156,02/03/2020,11/11/2016,Second Class,CG-12520,Consumer,FUR-BO-10001798,Bookcases,\"Bush Somerset Collection Bookcase\",100,2,0.1,20",
    "2,CA-2016-138688, 2020-03-02 ,13/06/2016,Standard Class,DV-13045,Corporate,OFF-LA-10000240,Labels,\"Self-Adhesive Address Labels\",14.62,,abc,6.8714",
    "3,US-2015-108966,not a date,10/18/2015,Standard Class,SO-20335,Consumer,FUR-TA-10000577,Tables,\"Bretford CR4500 Series, Slim Rectangular Table\",957.5775,5,0.45,-383.031",
];

pub fn sample_csv() -> String {
    let mut contents = String::from(RAW_HEADER);
    contents.push('\n');
    for row in SAMPLE_ROWS {
        contents.push_str(row);
        contents.push('\n');
    }
    contents
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Lists file names currently in the workspace root, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names = fs::read_dir(self.path())
            .expect("read workspace dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        names
    }
}
