use actix_web::{web, App, HttpServer};
use log::info;

use keepsake::api::{
    delete_album, delete_song, fetch_blob, list_albums, list_songs, update_album, update_song,
    upload_album, upload_song,
};
use keepsake::app_state::AppState;
use keepsake::config::AppConfig;
use keepsake::sweep::OrphanSweeper;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().expect("Failed to load configuration");
    log4rs::init_file(&config.logging.config_file, Default::default()).unwrap();

    let state = AppState::from_config(config.clone());

    if config.sweep.enabled {
        OrphanSweeper::new(
            state.blobs.clone(),
            state.albums.clone(),
            state.songs.clone(),
            &config.sweep,
        )
        .start_background();
    }

    info!(
        "Starting server on {}:{}",
        config.server.host, config.server.port
    );

    let data = web::Data::new(state);
    let max_payload = config.server.max_payload_size;
    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::PayloadConfig::default().limit(max_payload))
            .app_data(data.clone())
            .service(list_albums)
            .service(upload_album)
            .service(update_album)
            .service(delete_album)
            .service(list_songs)
            .service(upload_song)
            .service(update_song)
            .service(delete_song)
            .service(fetch_blob)
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
