// PromptDeck Desktop - Tauri Application Entry Point
// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use promptdeck_desktop::commands::page::PageState;
use promptdeck_desktop::state::AppState;

fn main() {
    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .manage(AppState::new())
        .manage(PageState::new())
        .invoke_handler(tauri::generate_handler![
            // Initialization commands
            promptdeck_desktop::commands::init::init_app,
            promptdeck_desktop::commands::init::get_version,
            // Health commands
            promptdeck_desktop::commands::health::get_health,
            // Settings commands
            promptdeck_desktop::commands::settings::get_settings,
            promptdeck_desktop::commands::settings::update_settings,
            // Prompt library commands
            promptdeck_desktop::commands::prompts::list_prompts,
            promptdeck_desktop::commands::prompts::save_prompt,
            promptdeck_desktop::commands::prompts::delete_prompt,
            promptdeck_desktop::commands::prompts::reload_prompts,
            // Variable library commands
            promptdeck_desktop::commands::variables::list_variables,
            promptdeck_desktop::commands::variables::save_variable,
            promptdeck_desktop::commands::variables::delete_variable,
            // History commands
            promptdeck_desktop::commands::history::list_history,
            promptdeck_desktop::commands::history::delete_history_entry,
            promptdeck_desktop::commands::history::clear_history,
            // Enhancement commands
            promptdeck_desktop::commands::enhance::enhance_prompt,
            // Auth commands
            promptdeck_desktop::commands::auth::check_auth,
            promptdeck_desktop::commands::auth::login,
            promptdeck_desktop::commands::auth::store_auth_token,
            promptdeck_desktop::commands::auth::logout,
            // Page session commands
            promptdeck_desktop::commands::page::attach_page,
            promptdeck_desktop::commands::page::detach_page,
            promptdeck_desktop::commands::page::insert_prompt,
            promptdeck_desktop::commands::page::dispatch_action,
            promptdeck_desktop::commands::page::resolve_page_eval,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
