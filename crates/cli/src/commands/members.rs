use shop_core::AppConfig;
use shop_orm::MemberQueryRepository;

use super::{connect, print_json};

pub async fn list(config: &AppConfig, id: Option<i64>) -> anyhow::Result<()> {
    let repository = MemberQueryRepository::new(connect(config).await?);
    match id {
        Some(id) => print_json(&repository.find_one(id).await?),
        None => print_json(&repository.find_members().await?),
    }
}
