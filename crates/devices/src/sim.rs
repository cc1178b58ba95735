//! Simulated board contexts on top of [`MockBackend`].
//!
//! The descriptions list the devices, channels and attributes the facades
//! touch, with device ids in the order a real board enumerates them. Values
//! are seeded as an idle board reads them: LOs at 2.4 GHz, no tone on the
//! air, AGC gain near the top of its range.

use sdr_hil_iio::mock::MockBackend;
use sdr_hil_iio::{AttrPath, ChannelInfo, ContextDescription, DeviceInfo};

use crate::{daq2, fmcomms5};

/// `ad7291` device id.
pub const AD7291_ID: &str = "iio:device0";
/// `ad9361-phy` device id.
pub const CTRL_ID: &str = "iio:device1";
/// `ad9361-phy-B` device id.
pub const CTRL_B_ID: &str = "iio:device2";
/// `cf-ad9361-dds-core-lpc` device id.
pub const TXDAC_ID: &str = "iio:device3";
/// `cf-ad9361-A` device id.
pub const RXADC_ID: &str = "iio:device4";
/// `cf-ad9361-dds-core-B` device id.
pub const TXDAC_B_ID: &str = "iio:device5";
/// `cf-ad9361-B` device id.
pub const RXADC_B_ID: &str = "iio:device6";

/// `axi-ad9680-hpc` device id.
pub const DAQ2_RXADC_ID: &str = "iio:device2";
/// `axi-ad9144-hpc` device id.
pub const DAQ2_TXDAC_ID: &str = "iio:device3";

/// Receive channel attributes of the AD9361 PHY.
const PHY_RX_ATTRS: &[&str] = &[
    "sampling_frequency",
    "rf_bandwidth",
    "gain_control_mode",
    "hardwaregain",
    "rssi",
    "filter_fir_en",
    "quadrature_tracking_en",
    "rf_port_select",
];

const PHY_TX_ATTRS: &[&str] = &[
    "sampling_frequency",
    "rf_bandwidth",
    "hardwaregain",
    "filter_fir_en",
    "rf_port_select",
];

const DDS_ATTRS: &[&str] = &["frequency", "scale", "phase", "raw"];
const CORE_ATTRS: &[&str] = &["calibphase", "calibscale", "sampling_frequency"];

fn phy(id: &str, name: &str) -> DeviceInfo {
    DeviceInfo::new(id, name)
        .with_attrs(["ensm_mode", "calib_mode"])
        .with_debug_attrs(["loopback"])
        .with_channel(ChannelInfo::output("altvoltage0").named("RX_LO").with_attrs(["frequency"]))
        .with_channel(ChannelInfo::output("altvoltage1").named("TX_LO").with_attrs(["frequency"]))
        .with_channel(ChannelInfo::input("voltage0").with_attrs(PHY_RX_ATTRS.iter().copied()))
        .with_channel(ChannelInfo::input("voltage1").with_attrs(PHY_RX_ATTRS.iter().copied()))
        .with_channel(
            ChannelInfo::input("voltage2").with_attrs(["filter_fir_en", "quadrature_tracking_en"]),
        )
        .with_channel(ChannelInfo::output("voltage0").with_attrs(PHY_TX_ATTRS.iter().copied()))
        .with_channel(ChannelInfo::output("voltage1").with_attrs(PHY_TX_ATTRS.iter().copied()))
        .with_channel(ChannelInfo::input("out").with_attrs(["voltage_filter_fir_en"]))
}

fn rx_core(id: &str, name: &str, channels: u32, extra: &[&str]) -> DeviceInfo {
    (0..channels).fold(DeviceInfo::new(id, name), |dev, n| {
        dev.with_channel(
            ChannelInfo::input(format!("voltage{n}"))
                .with_attrs(CORE_ATTRS.iter().chain(extra).copied()),
        )
    })
}

fn tx_core(id: &str, name: &str, channels: u32, tones: u32) -> DeviceInfo {
    let dev = (0..channels).fold(DeviceInfo::new(id, name), |dev, n| {
        dev.with_channel(
            ChannelInfo::output(format!("voltage{n}")).with_attrs(CORE_ATTRS.iter().copied()),
        )
    });
    (0..tones).fold(dev, |dev, n| {
        dev.with_channel(
            ChannelInfo::output(format!("altvoltage{n}")).with_attrs(DDS_ATTRS.iter().copied()),
        )
    })
}

fn ad7291() -> DeviceInfo {
    let dev = DeviceInfo::new(AD7291_ID, fmcomms5::AD7291)
        .with_channel(ChannelInfo::input("temp0").with_attrs(["raw", "scale"]));
    (0..8).fold(dev, |dev, n| {
        dev.with_channel(ChannelInfo::input(format!("voltage{n}")).with_attrs(["raw", "scale"]))
    })
}

/// Readings inside the housekeeping bounds.
pub const AD7291_READINGS: &[(&str, &str)] = &[
    ("temp0", "120"),
    ("voltage0", "1800"),
    ("voltage1", "3300"),
    ("voltage2", "3300"),
    ("voltage3", "3700"),
    ("voltage4", "1300"),
    ("voltage5", "1300"),
    ("voltage6", "1300"),
    ("voltage7", "1300"),
];

/// FMComms5 context description.
pub fn fmcomms5_description() -> ContextDescription {
    ContextDescription::new("mock")
        .with_attr("hw_carrier", "Xilinx Zynq ZC702 Rev1.0")
        .with_device(ad7291())
        .with_device(phy(CTRL_ID, fmcomms5::CTRL))
        .with_device(phy(CTRL_B_ID, fmcomms5::CTRL_B))
        .with_device(tx_core(TXDAC_ID, fmcomms5::TXDAC, 4, 8))
        .with_device(rx_core(RXADC_ID, fmcomms5::RXADC, 4, &[]))
        .with_device(tx_core(TXDAC_B_ID, fmcomms5::TXDAC_B, 4, 8))
        .with_device(rx_core(RXADC_B_ID, fmcomms5::RXADC_B, 4, &[]))
}

fn seed_phy(backend: &MockBackend, id: &str) {
    backend.seed(AttrPath::channel(id, "altvoltage0", true, "frequency"), "2400000000");
    backend.seed(AttrPath::channel(id, "altvoltage1", true, "frequency"), "2400000000");
    for output in [false, true] {
        backend.seed(AttrPath::channel(id, "voltage0", output, "sampling_frequency"), "30720000");
        backend.seed(AttrPath::channel(id, "voltage0", output, "rf_bandwidth"), "18000000");
    }
    for n in 0..2 {
        let chan = format!("voltage{n}");
        backend.seed(AttrPath::channel(id, &chan, false, "gain_control_mode"), "slow_attack");
        backend.seed(AttrPath::channel(id, &chan, false, "hardwaregain"), "71.000000 dB");
        backend.seed(AttrPath::channel(id, &chan, false, "rssi"), "100.25 dB");
        backend.seed(AttrPath::channel(id, &chan, true, "hardwaregain"), "-10.000000 dB");
        backend.quantize(AttrPath::channel(id, &chan, true, "hardwaregain"), 0.25);
    }
}

/// Simulated FMComms5.
pub fn fmcomms5() -> MockBackend {
    fmcomms5_from(fmcomms5_description())
}

/// Simulated FMComms5 with the device `name` removed.
pub fn fmcomms5_without(name: &str) -> MockBackend {
    let mut description = fmcomms5_description();
    description
        .devices
        .retain(|d| d.name.as_deref() != Some(name));
    fmcomms5_from(description)
}

fn fmcomms5_from(description: ContextDescription) -> MockBackend {
    let backend = MockBackend::new(description);
    for (chan, value) in AD7291_READINGS {
        backend.seed(AttrPath::channel(AD7291_ID, *chan, false, "raw"), *value);
    }
    seed_phy(&backend, CTRL_ID);
    seed_phy(&backend, CTRL_B_ID);
    backend
}

/// DAQ2 context description.
pub fn daq2_description() -> ContextDescription {
    ContextDescription::new("mock")
        .with_attr("hw_carrier", "Xilinx Kintex-7 KC705")
        .with_device(DeviceInfo::new("iio:device0", "ad9523-lpc"))
        .with_device(DeviceInfo::new("iio:device1", "axi-ad9144-hpc-dac-sync"))
        .with_device(
            rx_core(DAQ2_RXADC_ID, daq2::RXADC, 2, &["test_mode"])
                .with_debug_attrs(["pseudorandom_err_check"]),
        )
        .with_device(tx_core(DAQ2_TXDAC_ID, daq2::TXDAC, 2, 8))
}

/// Simulated DAQ2.
pub fn daq2() -> MockBackend {
    let backend = MockBackend::new(daq2_description());
    backend.seed(
        AttrPath::channel(DAQ2_RXADC_ID, "voltage0", false, "sampling_frequency"),
        "1000000000",
    );
    backend.seed(
        AttrPath::channel(DAQ2_TXDAC_ID, "voltage0", true, "sampling_frequency"),
        "1000000000",
    );
    backend
}
