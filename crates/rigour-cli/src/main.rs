mod cache;
mod command;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
