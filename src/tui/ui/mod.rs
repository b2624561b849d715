//! TUI rendering module.
//!
//! - `icons` - icons used throughout the UI
//! - `layout` - layout calculations and text utilities
//! - `tree` - header and tree pane
//! - `detail` - selected issue with comments
//! - `status` - status bar and popups

pub mod icons;
pub mod layout;
mod detail;
mod status;
mod tree;

use crate::tui::App;
use ratatui::Frame;

/// Main draw function - renders the entire TUI.
///
/// Takes the app mutably only to record the tree viewport height, which
/// the view needs for half-page moves and scroll clamping.
pub fn draw(f: &mut Frame, app: &mut App) {
    let screen = layout::screen_layout(f.area());
    let height = layout::tree_viewport_height(f.area());
    if height != app.view.viewport_height {
        app.view.set_viewport_height(height);
    }

    let app: &App = app;
    tree::draw_header(f, app, screen.header);
    tree::draw_tree(f, app, screen.tree);
    detail::draw_detail(f, app, screen.detail);
    status::draw_status_bar(f, app, screen.status);
    status::draw_modal(f, app);
}
