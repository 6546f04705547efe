use anyhow::Result;
use digkit::cli::App;

fn main() -> Result<()> {
    let (mut app, args) = App::from_args()?;

    app.run(args)?;

    Ok(())
}
