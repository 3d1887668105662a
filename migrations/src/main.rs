//! Standalone migration runner: `cargo run -p migrations -- up`

#[async_std::main]
async fn main() {
    sea_orm_migration::cli::run_cli(migrations::Migrator).await;
}
