#[actix_web::main]
async fn main() -> std::io::Result<()> {
    statutory_declaration_server::run().await
}
