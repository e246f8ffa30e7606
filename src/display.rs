//! X11 display queries
//!
//! DPI and compositor detection for icon scaling and window transparency,
//! plus the best-effort check for an already open dialog.

use anyhow::{Context, Result};
use std::process::Command;
use tracing::{debug, info, warn};
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{Atom, AtomEnum, ConnectionExt as _, Window};
use x11rb::rust_connection::RustConnection;

/// What we learn about the display at start-up
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisplayInfo {
    /// Xft.dpi; `None` when unset, which scales like 96
    pub dpi: Option<f32>,
    /// A compositing manager owns `_NET_WM_CM_S<n>`
    pub composited: bool,
}

impl DisplayInfo {
    pub fn query() -> Result<Self> {
        let (conn, screen_num) =
            RustConnection::connect(None).context("Failed to connect to X server")?;
        let screen = &conn.setup().roots[screen_num];

        let dpi = resource_dpi(&conn, screen.root)?;
        let composited = compositor_running(&conn, screen_num)?;

        let info = Self { dpi, composited };
        info!("Display: dpi={:?}, composited={}", info.dpi, info.composited);
        Ok(info)
    }
}

/// Read `Xft.dpi` from the root window's resource database
fn resource_dpi(conn: &RustConnection, root: Window) -> Result<Option<f32>> {
    let reply = conn
        .get_property(
            false,
            root,
            AtomEnum::RESOURCE_MANAGER,
            AtomEnum::STRING,
            0,
            u32::MAX / 4,
        )?
        .reply()?;

    Ok(parse_xft_dpi(&String::from_utf8_lossy(&reply.value)))
}

fn compositor_running(conn: &RustConnection, screen_num: usize) -> Result<bool> {
    let name = format!("_NET_WM_CM_S{}", screen_num);
    let atom = conn.intern_atom(false, name.as_bytes())?.reply()?.atom;
    let owner = conn.get_selection_owner(atom)?.reply()?.owner;
    Ok(owner != x11rb::NONE)
}

/// Extract `Xft.dpi` from an X resource string
pub fn parse_xft_dpi(resources: &str) -> Option<f32> {
    resources.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "Xft.dpi" {
            return None;
        }
        value.trim().parse::<f32>().ok().filter(|dpi| *dpi > 0.0)
    })
}

/// Check whether a window titled `title` is already mapped.
///
/// Asks the window manager's client list first and falls back to
/// `wmctrl`. Any failure counts as "not open".
pub fn window_already_open(title: &str) -> bool {
    match client_titles() {
        Ok(titles) => titles_mention(&titles, title),
        Err(e) => {
            debug!("EWMH client list unavailable ({}), trying wmctrl", e);
            wmctrl_lists(title)
        }
    }
}

fn client_titles() -> Result<Vec<String>> {
    let (conn, screen_num) = RustConnection::connect(None)?;
    let root = conn.setup().roots[screen_num].root;

    let net_client_list = conn.intern_atom(false, b"_NET_CLIENT_LIST")?.reply()?;
    let net_wm_name = conn.intern_atom(false, b"_NET_WM_NAME")?.reply()?.atom;
    let utf8_string = conn.intern_atom(false, b"UTF8_STRING")?.reply()?.atom;
    let reply = conn
        .get_property(false, root, net_client_list.atom, AtomEnum::WINDOW, 0, 1024)?
        .reply()?;

    let titles = decode_window_list(&reply.value)
        .into_iter()
        .filter_map(|window| window_title(&conn, window, net_wm_name, utf8_string))
        .collect();
    Ok(titles)
}

/// Split a 32-bit WINDOW property into window ids
pub fn decode_window_list(value: &[u8]) -> Vec<Window> {
    value
        .chunks_exact(4)
        .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

fn window_title(
    conn: &RustConnection,
    window: Window,
    net_wm_name: Atom,
    utf8_string: Atom,
) -> Option<String> {
    // Try _NET_WM_NAME first
    let candidates = [
        (net_wm_name, utf8_string),
        (AtomEnum::WM_NAME.into(), AtomEnum::STRING.into()),
    ];

    candidates.into_iter().find_map(|(property, kind)| {
        let reply = conn
            .get_property(false, window, property, kind, 0, 256)
            .ok()?
            .reply()
            .ok()?;
        String::from_utf8(reply.value)
            .ok()
            .filter(|title| !title.is_empty())
    })
}

fn wmctrl_lists(title: &str) -> bool {
    match Command::new("wmctrl").args(["-l", "-x"]).output() {
        Ok(output) => listing_mentions(&String::from_utf8_lossy(&output.stdout), title),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("wmctrl not found, skipping duplicate-window check");
            false
        }
        Err(e) => {
            warn!("wmctrl check failed: {}", e);
            false
        }
    }
}

/// True when any client title contains `title`
pub fn titles_mention(titles: &[String], title: &str) -> bool {
    titles.iter().any(|t| t.contains(title))
}

/// True when any line of a `wmctrl -l -x` listing mentions `title`
pub fn listing_mentions(listing: &str, title: &str) -> bool {
    listing.lines().any(|line| line.contains(title))
}
