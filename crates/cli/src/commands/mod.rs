pub mod decode;
pub mod dump;
pub mod locate;
pub mod recover;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use bkflash_kernel::layout::HeaderRecord;

/// Parse a decimal or `0x`-prefixed hexadecimal address.
pub fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

pub(crate) fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub(crate) fn header_table(header: &HeaderRecord) -> Table {
    let ts = chrono::DateTime::from_timestamp(header.timestamp as i64, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let mut t = table(vec!["Field", "Value"]);
    t.add_row(vec!["magic".to_string(), format!("'{}'", header.magic_str())]);
    t.add_row(vec!["ota_alg".to_string(), format!("{:08x}", header.ota_alg)]);
    t.add_row(vec!["timestamp".to_string(), format!("{} ({ts})", header.timestamp)]);
    t.add_row(vec!["name".to_string(), format!("'{}'", header.name_str())]);
    t.add_row(vec!["version".to_string(), format!("'{}'", header.version_str())]);
    t.add_row(vec!["serial_number".to_string(), format!("'{}'", header.serial_number_str())]);
    t.add_row(vec!["crc".to_string(), format!("{:08x}", header.crc)]);
    t.add_row(vec!["hash".to_string(), format!("{:08x}", header.hash)]);
    t.add_row(vec!["size_raw".to_string(), format!("{} ({:#x})", header.size_raw, header.size_raw)]);
    t.add_row(vec!["size_packaged".to_string(), format!("{} ({:#x})", header.size_packaged, header.size_packaged)]);
    t.add_row(vec!["header_crc".to_string(), format!("{:08x}", header.header_crc)]);
    t
}
