//! Offline bvid extraction

use anyhow::{Context, Result};
use clap::Parser;

use bilimon_server::models::Bvid;

#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Text containing a bvid, such as a video URL or share message
    pub text: String,

    /// Print the comment collection name instead of the bvid
    #[arg(long)]
    pub collection: bool,
}

pub fn run_extract(args: ExtractArgs) -> Result<()> {
    let bvid = Bvid::extract(&args.text).with_context(|| format!("no bvid in '{}'", args.text))?;
    if args.collection {
        println!("{}", bvid.collection_name());
    } else {
        println!("{bvid}");
    }
    Ok(())
}
