use cucumber::World;
use log::*;
use race_payment_engine::{
    db_types::Competition,
    events::EventProducers,
    reconciliation_objects::{BankAccount, ConfirmResult, OrderRecord},
    ReconciliationApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct ReconciliationWorld {
    pub system: Option<ReconciliationSystem>,
    pub competition: Option<Competition>,
    pub group_id: Option<i64>,
    pub last_order: Option<OrderRecord>,
    pub last_batch: Vec<ConfirmResult>,
}

impl ReconciliationWorld {
    pub fn api(&self) -> &ReconciliationApi<SqliteDatabase> {
        &self.system.as_ref().expect("ReconciliationApi not initialised").api
    }

    pub fn competition_id(&self) -> i64 {
        self.competition.as_ref().expect("No competition has been set up").id
    }
}

#[derive(Debug)]
pub struct ReconciliationSystem {
    pub db_path: String,
    pub api: ReconciliationApi<SqliteDatabase>,
}

impl ReconciliationSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        db.run_migrations().await.expect("Error running migrations");
        debug!("Created database: {url}");
        let account = BankAccount::new("123-456-789012", "국민은행");
        let api = ReconciliationApi::new(db, EventProducers::default(), account);
        Self { db_path: url, api }
    }
}

fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("rpg_cucumber_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}
