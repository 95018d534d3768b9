use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::PgConnection;
use log::info;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn(database_url: &str) -> Result<DbPool, PoolError> {
    info!("Creating database connection pool");
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(10).build(manager)
}
