use salt_plugins::{cli, PluginKind};

fn main() {
    std::process::exit(cli::run(PluginKind::Highstate));
}
