use std::path::PathBuf;

use clap::Parser;

/// Watch the temp directories and the recycle bin and purge them
/// once they take up more than one percent of the system volume.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Seconds to wait between two trash size estimations.
    #[arg(short, long, default_value_t = 60)]
    pub interval: u64,

    /// Use the given directory as temp root instead of the platform defaults.
    /// Can be specified multiple times.
    #[arg(short = 't', long = "temp-root", verbatim_doc_comment)]
    pub temp_roots: Vec<PathBuf>,

    /// Do not actually delete anything. Just report what would have been deleted.
    #[arg(short, long)]
    pub dry_run: bool,

    /// Run without the dashboard and log to the console instead.
    #[arg(long, conflicts_with_all = ["once", "clean_now"])]
    pub headless: bool,

    /// Estimate the trash size once, clean if the threshold has been reached and exit.
    #[arg(long, conflicts_with = "clean_now")]
    pub once: bool,

    /// Clean the trash right away, regardless of its size, and exit.
    #[arg(long)]
    pub clean_now: bool,

    /// Display the log in the dashboard as a split screen.
    #[arg(long)]
    pub ui_logger: bool,
}

impl Args {
    pub fn use_dashboard(&self) -> bool {
        !(self.headless || self.once || self.clean_now)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn defaults_to_dashboard() {
        let args = Args::try_parse_from(["tclean"]).unwrap();
        assert_eq!(args.interval, 60);
        assert!(args.temp_roots.is_empty());
        assert!(args.use_dashboard());
    }

    #[test]
    fn collects_multiple_temp_roots() {
        let args = Args::try_parse_from(["tclean", "-t", "/a", "--temp-root", "/b", "--once"])
            .unwrap();
        assert_eq!(args.temp_roots.len(), 2);
        assert!(!args.use_dashboard());
    }

    #[test]
    fn modes_are_exclusive() {
        assert!(Args::try_parse_from(["tclean", "--headless", "--once"]).is_err());
        assert!(Args::try_parse_from(["tclean", "--once", "--clean-now"]).is_err());
    }
}
