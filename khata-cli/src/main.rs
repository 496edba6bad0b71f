use anyhow::Result;

fn main() -> Result<()> {
    khata_cli::app::run()
}
