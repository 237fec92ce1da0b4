use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rulekit",
    version,
    about = "Package a folder of rule sources into a deployable bundle archive"
)]
pub struct Cli {
    /// Folder containing rule source files (.drl, .dsl, .dslr)
    pub rules_folder: PathBuf,

    /// Destination path for the bundle archive
    pub output_archive: PathBuf,
}
