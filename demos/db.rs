use std::sync::Arc;

use config_value::{bindable, AppContext, Bindings, Bound, ConfigStore, ValueModule};

#[derive(Debug, Default)]
struct Database {
    host: Bound,
    port: Bound,
    pool_size: Bound,
}

bindable!(Database {
    host: "database.host" = "localhost",
    port: "database.port" = 5432,
    pool_size: "database.pool[0].size",
});

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let table: toml::Table = toml::from_str(
        r#"
        [database]
        host = "db.example.com"

        [[database.pool]]
        size = 16
        "#,
    )?;

    let bindings = Arc::new(Bindings::builder().register::<Database>()?.build());
    let database = Arc::new(Database::default());

    let mut ctx = AppContext::builder()
        .with_config(ConfigStore::from(table))
        .with_module(ValueModule::register(bindings, true))
        .provider("app", "Database", Arc::clone(&database))
        .build()?;
    ctx.init()?;

    let host: Option<String> = database.host.get_as()?;
    let port: Option<u16> = database.port.get_as()?;
    let pool_size: Option<u32> = database.pool_size.get_as()?;

    println!("Database: {host:?}:{port:?} (pool={pool_size:?})");

    Ok(())
}
