pub mod health;
pub mod lifecycle;
pub mod stats;
pub mod targets;

const INDEX: &str = "\
Commands available for benchmark:
    GET    /                              - show commands
    GET    /targets[?columns=<C,..>]      - list current database workloads
    POST   /targets/<ID>                  - add workload for database
    GET    /targets/<ID>                  - show workload for database
    DELETE /targets/<ID>                  - remove workload for database
    POST   /start                         - start benchmark
    POST   /stop                          - stop benchmark
    GET    /wait/<N>[?timeout_secs=<S>]   - wait for at least N results
    GET    /stats[?target=<ID>]           - get current result counts
    GET    /stats/table                   - get results of all databases as one table
    GET    /stats/<ID>[/<OPERATION>]      - get results for one database
";

/// GET /
pub async fn index() -> &'static str {
    INDEX
}
