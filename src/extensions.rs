//! Extension node loading
//!
//! Implements the `-x name:pinBase:params` mini-language: colon-separated
//! tokens naming a chip driver, the virtual pin base it should claim, and
//! chip-specific parameters, dispatched to the matching feature-gated
//! constructor.

use pinwire_core::Gpio;

type LoadResult = Result<(), Box<dyn std::error::Error>>;

/// An extension driver this build can load.
pub struct ExtensionInfo {
    /// Name matched against the first token
    pub name: &'static str,
    /// Usage string for the parameter tokens
    pub usage: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Extension drivers enabled at compile time.
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_extensions() -> Vec<ExtensionInfo> {
    let mut extensions = Vec::new();

    #[cfg(feature = "mcp23017")]
    extensions.push(ExtensionInfo {
        name: "mcp23017",
        usage: "mcp23017:<pinBase>:<i2cAddr>[:<i2cDev>]",
        description: "MCP23017 16-bit I2C GPIO expander",
    });

    extensions
}

/// Short name list for CLI help text.
pub fn extension_names_short() -> String {
    let extensions = available_extensions();
    if extensions.is_empty() {
        return "none compiled in".to_string();
    }
    let names: Vec<&str> = extensions.iter().map(|e| e.name).collect();
    names.join(", ")
}

/// Split an extension spec into name, pin base and parameter tokens.
fn parse_spec(spec: &str) -> Result<(&str, u32, Vec<&str>), String> {
    let mut tokens = spec.split(':');
    let name = tokens.next().filter(|t| !t.is_empty()).ok_or_else(|| {
        format!("empty extension spec {spec:?}, expected name:pinBase:params")
    })?;
    let pin_base = tokens
        .next()
        .ok_or_else(|| format!("extension {name:?} needs a pin base, e.g. {name}:100:..."))?;
    let pin_base = pin_base
        .parse::<u32>()
        .map_err(|e| format!("bad pin base {pin_base:?} for {name}: {e}"))?;
    Ok((name, pin_base, tokens.collect()))
}

/// Load one extension spec and register its node with `gpio`.
#[allow(unused_variables)]
pub fn load(gpio: &Gpio, spec: &str) -> LoadResult {
    let (name, pin_base, params) = parse_spec(spec)?;

    match name {
        #[cfg(feature = "mcp23017")]
        "mcp23017" => load_mcp23017(gpio, pin_base, &params),

        _ => {
            let mut msg = format!("Unknown extension: {name}\n\nAvailable extensions:\n");
            for e in available_extensions() {
                let usage = e.usage;
                let description = e.description;
                msg.push_str(&format!("  {usage} - {description}\n"));
            }
            Err(msg.into())
        }
    }
}

#[cfg(feature = "mcp23017")]
fn load_mcp23017(gpio: &Gpio, pin_base: u32, params: &[&str]) -> LoadResult {
    use crate::cli::parse_hex_u32;

    let address = params
        .first()
        .ok_or("mcp23017 needs an I2C address, e.g. mcp23017:100:0x20")?;
    let address = parse_hex_u32(address)?;
    let address = u16::try_from(address).map_err(|_| format!("I2C address {address:#x} out of range"))?;
    let device = params.get(1).copied().unwrap_or("/dev/i2c-1");

    log::info!("loading mcp23017 at {device} addr {address:#04x}, pins {pin_base}..");
    let node = pinwire_mcp23017::Mcp23017::open(device, address, pin_base)?;
    gpio.register_node(Box::new(node))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_splits_into_name_base_params() {
        let (name, base, params) = parse_spec("mcp23017:100:0x20").unwrap();
        assert_eq!(name, "mcp23017");
        assert_eq!(base, 100);
        assert_eq!(params, vec!["0x20"]);
    }

    #[test]
    fn spec_without_base_is_rejected() {
        assert!(parse_spec("mcp23017").is_err());
        assert!(parse_spec("").is_err());
        assert!(parse_spec("mcp23017:banana:0x20").is_err());
    }

    #[test]
    fn unknown_extension_lists_available() {
        let gpio = Gpio::new(pinwire_dummy::driver(), pinwire_core::NumberingMode::Logical);
        let err = load(&gpio, "nosuchchip:100").unwrap_err();
        assert!(err.to_string().contains("Unknown extension"));
    }
}
