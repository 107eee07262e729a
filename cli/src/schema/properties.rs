//! Declarative table of every configurable connection property.
//!
//! Each entry is a [`PropertySpec`]; the registry derives descriptors and the
//! inheritance toggle schema from this single table.

use super::value::{DefaultValue, ValueType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    Display,
    Connection,
    Protocol,
    Gateway,
    Appearance,
    Redirect,
    Miscellaneous,
    Vnc,
}

/// Explicit metadata that overrides the derived defaults for one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declared {
    pub inheritable: bool,
    pub serializable: bool,
    pub encrypted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub category: Category,
    pub value_type: ValueType,
    pub default: DefaultValue,
    /// Has a same-named slot in the inheritance toggle schema.
    pub toggle: bool,
    pub writable: bool,
    pub browsable: bool,
    pub password: bool,
    pub declared: Option<Declared>,
}

impl PropertySpec {
    pub const fn new(
        name: &'static str,
        category: Category,
        value_type: ValueType,
        default: DefaultValue,
    ) -> Self {
        Self {
            name,
            category,
            value_type,
            default,
            toggle: false,
            writable: true,
            browsable: true,
            password: false,
            declared: None,
        }
    }

    pub const fn inherits(self) -> Self {
        Self { toggle: true, ..self }
    }

    pub const fn hidden(self) -> Self {
        Self { browsable: false, ..self }
    }

    pub const fn secret(self) -> Self {
        Self { password: true, ..self }
    }

    pub const fn read_only(self) -> Self {
        Self { writable: false, ..self }
    }

    pub const fn declare(self, declared: Declared) -> Self {
        Self {
            declared: Some(declared),
            ..self
        }
    }
}

const fn text(name: &'static str, category: Category) -> PropertySpec {
    PropertySpec::new(name, category, ValueType::String, DefaultValue::Str(""))
}

const fn text_or(name: &'static str, category: Category, default: &'static str) -> PropertySpec {
    PropertySpec::new(name, category, ValueType::String, DefaultValue::Str(default))
}

const fn flag(name: &'static str, category: Category, default: bool) -> PropertySpec {
    PropertySpec::new(name, category, ValueType::Bool, DefaultValue::Bool(default))
}

const fn int(name: &'static str, category: Category, default: i64) -> PropertySpec {
    PropertySpec::new(name, category, ValueType::Int, DefaultValue::Int(default))
}

const fn choice(
    name: &'static str,
    category: Category,
    variants: &'static [&'static str],
    default: &'static str,
) -> PropertySpec {
    PropertySpec::new(name, category, ValueType::Enum(variants), DefaultValue::Str(default))
}

pub const PROTOCOLS: &[&str] = &[
    "rdp", "vnc", "ssh1", "ssh2", "telnet", "rlogin", "raw", "http", "https", "powershell", "ard",
    "intapp",
];
const FRAME_COLORS: &[&str] = &["none", "red", "yellow", "green", "blue", "purple"];
const CREDENTIAL_PROVIDERS: &[&str] = &[
    "none",
    "delinea_secret_server",
    "clickstudios_passwordstate",
    "vault_openbao",
];
const ADDRESS_SOURCES: &[&str] = &["hostname", "ip_address"];
const ADDRESS_PROVIDERS: &[&str] = &["none", "amazon_web_services"];
const VAULT_ENGINES: &[&str] = &["kv", "ldap_dynamic", "ldap_static"];
const RDP_VERSIONS: &[&str] = &["rdc6", "rdc7", "rdc8", "rdc10", "rdc11", "highest"];
const AUTH_LEVELS: &[&str] = &["no_auth", "auth_required", "warn_on_failed_auth"];
const RENDERING_ENGINES: &[&str] = &["ie", "edge_chromium"];
const GATEWAY_USAGE: &[&str] = &["never", "always", "detect"];
const GATEWAY_CREDENTIALS: &[&str] = &["no", "yes", "smart_card", "external_credential_provider"];
const RESOLUTIONS: &[&str] = &[
    "fit_to_window",
    "fullscreen",
    "smart_size",
    "800x600",
    "1024x768",
    "1280x1024",
    "1920x1080",
];
const SIZING_MODES: &[&str] = &["smart_size", "smart_size_aspect", "none"];
const SCALE_FACTORS: &[&str] = &["auto", "expand_to_fit", "fill", "native"];
const COLOR_DEPTHS: &[&str] = &[
    "colors_256",
    "colors_15bit",
    "colors_16bit",
    "colors_24bit",
    "colors_32bit",
];
const DISK_REDIRECTION: &[&str] = &["none", "local", "all", "custom"];
const SOUND_REDIRECTION: &[&str] = &[
    "bring_to_this_computer",
    "leave_at_remote_computer",
    "do_not_play",
];
const SOUND_QUALITY: &[&str] = &["dynamic", "medium", "high"];
const VNC_COMPRESSION: &[&str] = &[
    "none", "level_0", "level_1", "level_2", "level_3", "level_4", "level_5", "level_6", "level_7",
    "level_8", "level_9",
];
const VNC_ENCODINGS: &[&str] = &[
    "raw", "rre", "corre", "hextile", "zlib", "tight", "zlibhex", "zrle",
];
const VNC_AUTH_MODES: &[&str] = &["vnc", "windows"];
const VNC_PROXY_TYPES: &[&str] = &["none", "http", "socks5", "ultra"];
const VNC_COLORS: &[&str] = &["normal", "colors_8bit"];
const VNC_SMART_SIZE: &[&str] = &["no_smart_size", "free", "aspect"];

use Category::*;

/// Every connection property, in display order.
pub const PROPERTY_TABLE: &[PropertySpec] = &[
    // General
    text("name", General),
    text("description", General).inherits(),
    text_or("icon", General, "mRemoteNG").inherits(),
    text_or("panel", General, "General").inherits(),
    text("credential_id", General).hidden().declare(Declared {
        inheritable: false,
        serializable: true,
        encrypted: false,
    }),
    flag("is_template", General, false),
    flag("auto_sort", General, false).inherits(),
    // Display
    text("color", Display).inherits(),
    text("tab_color", Display).inherits(),
    choice("connection_frame_color", Display, FRAME_COLORS, "none").inherits(),
    // Connection
    text("hostname", Connection).inherits(),
    text("ip_address", Connection),
    choice("connection_address_primary", Connection, ADDRESS_SOURCES, "hostname"),
    text("alternative_address", Connection).inherits(),
    choice("external_address_provider", Connection, ADDRESS_PROVIDERS, "none"),
    text("ec2_instance_id", Connection),
    text("ec2_region", Connection),
    int("port", Connection, 3389).inherits(),
    choice("external_credential_provider", Connection, CREDENTIAL_PROVIDERS, "none").inherits(),
    text("user_via_api", Connection).inherits(),
    text("username", Connection).inherits(),
    text("password", Connection).inherits().secret(),
    text("domain", Connection).inherits(),
    text("vault_openbao_mount", Connection),
    text("vault_openbao_role", Connection),
    choice("vault_openbao_secret_engine", Connection, VAULT_ENGINES, "kv"),
    text("vm_id", Connection).inherits(),
    flag("use_enhanced_mode", Connection, false).inherits(),
    text("ssh_tunnel_connection_name", Connection).inherits(),
    text("opening_command", Connection).inherits(),
    // Protocol
    choice("protocol", Protocol, PROTOCOLS, "rdp").inherits(),
    choice("rdp_version", Protocol, RDP_VERSIONS, "highest").inherits(),
    text("ext_app", Protocol).inherits(),
    text_or("putty_session", Protocol, "Default Settings").inherits(),
    text("ssh_options", Protocol).inherits(),
    text("private_key_path", Protocol).inherits(),
    flag("use_console_session", Protocol, false).inherits(),
    choice("rdp_authentication_level", Protocol, AUTH_LEVELS, "no_auth").inherits(),
    int("rdp_minutes_to_idle_timeout", Protocol, 0).inherits(),
    flag("rdp_alert_idle_timeout", Protocol, false).inherits(),
    text("load_balance_info", Protocol).inherits(),
    text("rdp_sign_scope", Protocol).inherits().hidden(),
    text("rdp_signature", Protocol).inherits().hidden(),
    choice("rendering_engine", Protocol, RENDERING_ENGINES, "ie").inherits(),
    flag("script_errors_suppressed", Protocol, true).inherits(),
    flag("use_persistent_browser", Protocol, false),
    flag("show_browser_navigation_bar", Protocol, true),
    flag("use_cred_ssp", Protocol, true).inherits(),
    flag("use_restricted_admin", Protocol, false).inherits(),
    flag("use_rcg", Protocol, false).inherits(),
    flag("use_vm_id", Protocol, false).inherits(),
    // Gateway
    choice("rd_gateway_usage_method", Gateway, GATEWAY_USAGE, "never").inherits(),
    text("rd_gateway_hostname", Gateway).inherits(),
    choice("rd_gateway_use_connection_credentials", Gateway, GATEWAY_CREDENTIALS, "no").inherits(),
    text("rd_gateway_username", Gateway).inherits(),
    text("rd_gateway_password", Gateway).inherits().secret(),
    text("rd_gateway_domain", Gateway).inherits(),
    text("rd_gateway_access_token", Gateway).secret(),
    choice("rd_gateway_external_credential_provider", Gateway, CREDENTIAL_PROVIDERS, "none").inherits(),
    text("rd_gateway_user_via_api", Gateway).inherits(),
    // Appearance
    choice("resolution", Appearance, RESOLUTIONS, "fit_to_window").inherits(),
    choice("rdp_sizing_mode", Appearance, SIZING_MODES, "smart_size"),
    int("resolution_width", Appearance, 0),
    int("resolution_height", Appearance, 0),
    choice("desktop_scale_factor", Appearance, SCALE_FACTORS, "auto").inherits(),
    flag("automatic_resize", Appearance, true).inherits(),
    flag("rdp_use_multimon", Appearance, false),
    choice("colors", Appearance, COLOR_DEPTHS, "colors_16bit").inherits(),
    flag("cache_bitmaps", Appearance, false).inherits(),
    flag("display_wallpaper", Appearance, false).inherits(),
    flag("display_themes", Appearance, false).inherits(),
    flag("enable_font_smoothing", Appearance, false).inherits(),
    flag("enable_desktop_composition", Appearance, false).inherits(),
    flag("disable_full_window_drag", Appearance, false).inherits(),
    flag("disable_menu_animations", Appearance, false).inherits(),
    flag("disable_cursor_shadow", Appearance, false).inherits(),
    flag("disable_cursor_blinking", Appearance, false).inherits(),
    // Redirect
    flag("redirect_keys", Redirect, false).inherits(),
    choice("redirect_disk_drives", Redirect, DISK_REDIRECTION, "none").inherits(),
    text("redirect_disk_drives_custom", Redirect).inherits(),
    flag("redirect_printers", Redirect, false).inherits(),
    flag("redirect_clipboard", Redirect, true).inherits(),
    flag("redirect_ports", Redirect, false).inherits(),
    flag("redirect_smart_cards", Redirect, false).inherits(),
    choice("redirect_sound", Redirect, SOUND_REDIRECTION, "do_not_play").inherits(),
    choice("sound_quality", Redirect, SOUND_QUALITY, "dynamic").inherits(),
    flag("redirect_audio_capture", Redirect, false).inherits(),
    // Miscellaneous
    text("pre_ext_app", Miscellaneous).inherits(),
    text("post_ext_app", Miscellaneous).inherits(),
    text("mac_address", Miscellaneous).inherits(),
    text("user_field", Miscellaneous).inherits(),
    text("user_field1", Miscellaneous).inherits(),
    text("user_field2", Miscellaneous).inherits(),
    text("user_field3", Miscellaneous).inherits(),
    text("user_field4", Miscellaneous).inherits(),
    text("user_field5", Miscellaneous).inherits(),
    text("user_field6", Miscellaneous).inherits(),
    text("user_field7", Miscellaneous).inherits(),
    text("user_field8", Miscellaneous).inherits(),
    text("user_field9", Miscellaneous).inherits(),
    text("user_field10", Miscellaneous).inherits(),
    text("environment_tags", Miscellaneous).inherits(),
    flag("favorite", Miscellaneous, false).inherits(),
    flag("retry_on_first_connect", Miscellaneous, false).inherits(),
    // VNC
    choice("vnc_compression", Vnc, VNC_COMPRESSION, "none").inherits(),
    choice("vnc_encoding", Vnc, VNC_ENCODINGS, "hextile").inherits(),
    choice("vnc_auth_mode", Vnc, VNC_AUTH_MODES, "vnc").inherits(),
    choice("vnc_proxy_type", Vnc, VNC_PROXY_TYPES, "none").inherits(),
    text("vnc_proxy_ip", Vnc).inherits(),
    int("vnc_proxy_port", Vnc, 0).inherits(),
    text("vnc_proxy_username", Vnc).inherits(),
    text("vnc_proxy_password", Vnc).inherits().secret(),
    choice("vnc_colors", Vnc, VNC_COLORS, "normal").inherits(),
    choice("vnc_smart_size_mode", Vnc, VNC_SMART_SIZE, "aspect").inherits(),
    flag("vnc_view_only", Vnc, false).inherits(),
    flag("vnc_clipboard_redirect", Vnc, true).inherits(),
];

/// Properties that never inherit unless explicitly declared otherwise.
pub const KNOWN_NON_INHERITABLE: &[&str] = &["name", "credential_id", "is_template"];

/// Properties that are never persisted unless explicitly declared otherwise.
pub const KNOWN_NON_SERIALIZABLE: &[&str] = &[];

/// Read from the node itself even when it is a live alias.
pub const IDENTITY_PROPERTIES: &[&str] = &["name", "credential_id"];

/// Toggle-schema entries that control other toggles rather than mirror a property.
pub const META_TOGGLES: &[&str] = &["everything_inherited"];

/// Well-known port for a protocol variant, 0 when the protocol has none.
pub fn default_port(protocol: &str) -> i64 {
    match protocol.to_ascii_lowercase().as_str() {
        "rdp" => 3389,
        "vnc" | "ard" => 5900,
        "ssh1" | "ssh2" => 22,
        "telnet" | "raw" => 23,
        "rlogin" => 513,
        "http" => 80,
        "https" => 443,
        _ => 0,
    }
}
