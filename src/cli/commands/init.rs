//! Init command implementation
//!
//! This module implements the `init` command for generating a starter
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "quill.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Quill configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your table paths", self.output);
                println!("  2. Provide ANTHROPIC_API_KEY (environment, .env, or service.api_key_file)");
                println!("  3. Validate configuration: quill validate-config");
                println!("  4. Preview the run: quill enrich --dry-run");
                println!("  5. Run: quill enrich");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    /// Starter configuration with every default spelled out
    fn generate_config() -> &'static str {
        r#"# Quill Configuration File
# Resumable batch enrichment of code descriptions

[application]
log_level = "info"
dry_run = false

[source]
# Full code/description table; rewritten in place unless output_path is set
lookup_path = "web/public/data/hcpcs_lookup.parquet"
# Codes present here get their descriptions cleaned
reference_path = "web/public/data/hcpcs_summary.parquet"
id_column = "hcpcs_code"
text_column = "description"
# reference_id_column = "hcpcs_code"
# output_path = "web/public/data/hcpcs_lookup.parquet"

[service]
base_url = "https://api.anthropic.com"
api_version = "2023-06-01"
model = "claude-sonnet-4-20250514"
max_tokens = 4096
temperature = 0.0
timeout_seconds = 60
# Dotenv-style file holding the key; falls back to the environment
api_key_file = "web/.env.local"
api_key_var = "ANTHROPIC_API_KEY"

[batch]
batch_size = 100
pacing_delay_ms = 1000

[retry]
max_attempts = 3
backoff_seconds = 5
default_rate_limit_wait_seconds = 30
# Total rate-limit wait per batch before giving up (0 = no limit)
max_rate_limit_wait_seconds = 900
retry_malformed = true

[checkpoint]
path = "scripts/.hcpcs_clean_checkpoint.json"
lock = true

[report]
sample_ids = ["99213", "J3490", "A0428", "G0008"]

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
    }
}
