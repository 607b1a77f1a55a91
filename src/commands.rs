use std::sync::Arc;

use anyhow::Context;
use tauri::State;

use crate::config::AppConfig;
use crate::logging;
use crate::models::ConcertRecord;
use crate::storage::SqliteStorage;
use crate::store::{ConcertStore, StoreStatus};

#[tauri::command]
async fn fetch_concerts(store: State<'_, ConcertStore>) -> Result<StoreStatus, String> {
    store.fetch_concerts().await;
    Ok(store.snapshot())
}

#[tauri::command]
fn list_concerts(store: State<'_, ConcertStore>) -> Vec<ConcertRecord> {
    store.concerts()
}

#[tauri::command]
fn get_concert(id: String, store: State<'_, ConcertStore>) -> Result<ConcertRecord, String> {
    store
        .concert(&id)
        .ok_or_else(|| format!("concert {id} not found"))
}

#[tauri::command]
fn concerts_in_city(city: String, store: State<'_, ConcertStore>) -> Vec<ConcertRecord> {
    store.concerts_in_city(&city)
}

#[tauri::command]
fn store_status(store: State<'_, ConcertStore>) -> StoreStatus {
    store.snapshot()
}

#[tauri::command]
fn available_cities(store: State<'_, ConcertStore>) -> Vec<String> {
    store.available_cities()
}

#[tauri::command]
fn attending_count(store: State<'_, ConcertStore>) -> usize {
    store.attending_count()
}

#[tauri::command]
fn attending_ids(store: State<'_, ConcertStore>) -> Vec<String> {
    store.attending_ids()
}

#[tauri::command]
fn is_attending(id: String, store: State<'_, ConcertStore>) -> bool {
    store.is_attending(&id)
}

#[tauri::command]
fn toggle_attendance(id: String, store: State<'_, ConcertStore>) -> bool {
    store.toggle_attendance(&id)
}

#[tauri::command]
fn record_city_search(city: String, store: State<'_, ConcertStore>) -> Vec<String> {
    store.record_city_search(&city);
    store.recent_searches()
}

#[tauri::command]
fn recent_searches(store: State<'_, ConcertStore>) -> Vec<String> {
    store.recent_searches()
}

fn build_store() -> anyhow::Result<ConcertStore> {
    let config = AppConfig::load();
    let source = config
        .build_source()
        .context("failed to configure concert source")?;
    let storage = SqliteStorage::open_default().context("failed to open local storage")?;
    tracing::info!(source = source.name(), "concert store ready");
    Ok(ConcertStore::new(Arc::new(storage), source))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    logging::init();
    let store = match build_store() {
        Ok(store) => store,
        Err(err) => {
            tracing::error!("startup failed: {err:#}");
            std::process::exit(1);
        }
    };

    tauri::Builder::default()
        .manage(store)
        .plugin(tauri_plugin_opener::init())
        .invoke_handler(tauri::generate_handler![
            fetch_concerts,
            list_concerts,
            get_concert,
            concerts_in_city,
            store_status,
            available_cities,
            attending_count,
            attending_ids,
            is_attending,
            toggle_attendance,
            record_city_search,
            recent_searches
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
