//! Command-line definitions.

use clap::{Args, Parser, Subcommand, ValueEnum};
use signet_crypto::SignatureScheme;

/// Default prefix of the manifest file name.
pub const DEFAULT_MANIFEST_PREFIX: &str = "signatures";

/// Create and verify signatures for a collection of files.
#[derive(Debug, Parser)]
#[command(name = "signet", version, about)]
pub struct Signet {
    #[command(subcommand)]
    pub command: Command,
}

impl Signet {
    /// Whether the selected command asked for quiet output.
    pub fn quiet(&self) -> bool {
        match &self.command {
            Command::Sign(args) => args.quiet,
            Command::Verify(args) => args.quiet,
            Command::Version => false,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign files and write their signatures into the manifest file.
    ///
    /// The context id is an arbitrary word that ties the signatures to a
    /// topic (a domain separator). Without file arguments the current
    /// directory is signed; files must live inside the current directory
    /// tree.
    Sign(SignArgs),
    /// Verify files against the signatures in the manifest file.
    ///
    /// The verification id is the value printed when the signatures were
    /// created.
    Verify(VerifyArgs),
    /// Print version information.
    Version,
}

/// Arguments of the `sign` command.
#[derive(Debug, Args)]
pub struct SignArgs {
    /// Arbitrary string used as a domain separator.
    pub context_id: String,

    /// Files to sign. Names containing wildcards ('*', '?') are treated as
    /// include patterns; a single '-' reads the list from stdin.
    pub files: Vec<String>,

    /// Signature algorithm.
    #[arg(short = 'a', long, value_enum, default_value_t = Algorithm::Ed25519)]
    pub algorithm: Algorithm,

    /// Prefix of the manifest file name.
    #[arg(short = 'm', long = "name", default_value = DEFAULT_MANIFEST_PREFIX)]
    pub prefix: String,

    /// Name of a file that contains the list of files to sign.
    #[arg(short = 'f', long = "from-file")]
    pub from_file: Option<String>,

    /// Search the current directory and all subdirectories.
    #[arg(short = 'r', long)]
    pub recurse: bool,

    /// Read the list of files to sign from stdin.
    #[arg(short = 's', long)]
    pub stdin: bool,

    /// Only log warnings and errors.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// File name to include in signing (may contain wildcards).
    #[arg(short = 'i', long = "include-file", value_name = "PATTERN")]
    pub include_files: Vec<String>,

    /// File name to exclude from signing (may contain wildcards).
    #[arg(short = 'x', long = "exclude-file", value_name = "PATTERN")]
    pub exclude_files: Vec<String>,

    /// Directory name to include in signing (may contain wildcards).
    #[arg(short = 'I', long = "include-dir", value_name = "PATTERN")]
    pub include_dirs: Vec<String>,

    /// Directory name to exclude from signing (may contain wildcards).
    #[arg(short = 'X', long = "exclude-dir", value_name = "PATTERN")]
    pub exclude_dirs: Vec<String>,
}

/// Arguments of the `verify` command.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// The verification id printed when the signatures were created.
    pub verification_id: String,

    /// Prefix of the manifest file name.
    #[arg(short = 'm', long = "name", default_value = DEFAULT_MANIFEST_PREFIX)]
    pub prefix: String,

    /// Only log warnings and errors.
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Ed25519 with fenced digests.
    #[value(name = "ed25519")]
    Ed25519,
    /// ECDSA over NIST P-521.
    #[value(name = "ecdsap521")]
    EcDsaP521,
}

impl Algorithm {
    /// The signature scheme this selection stands for.
    pub fn scheme(self) -> SignatureScheme {
        match self {
            Self::Ed25519 => SignatureScheme::Ed25519,
            Self::EcDsaP521 => SignatureScheme::EcDsaP521,
        }
    }
}
