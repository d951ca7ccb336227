use finflow_api::{endpoints::TransactionType, ApiError, Client, Request};

#[tokio::main]
pub async fn main() -> Result<(), ApiError> {
    let client = Client::default();

    let req = Request::categories().list(Some(TransactionType::Expense));

    let _res = client.send(req).await?;
    Ok(())
}
