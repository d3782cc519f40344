use pocket_ledger::{cli::run_cli, init};

fn main() {
    init();

    // Timers for expiring confirmations run here, off the request path.
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("pocket-ledger-timers")
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run_cli(runtime.handle().clone()) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
