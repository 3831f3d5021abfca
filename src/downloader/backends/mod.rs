// Fetch backends

pub mod ytdlp;

pub use ytdlp::{YtDlpCli, YtDlpConfig};
