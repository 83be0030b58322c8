//! DUT signal bundles.
//!
//! Plain snapshots of the wires crossing the harness/DUT boundary. Inputs are driven by the
//! harness; outputs are sampled from the DUT once per clock period.

/// Instruction port request, driven by the DUT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InstrRequest {
    /// `imem_req_o`
    pub req: bool,
    /// `imem_addr_o`
    pub addr: u64,
}

/// Data port request, driven by the DUT.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataRequest {
    /// `dmem_req_o`
    pub req: bool,
    /// `dmem_addr_o`
    pub addr: u64,
    /// `dmem_we_o`
    pub we: bool,
    /// `dmem_be_o`: byte-lane strobe.
    pub be: u8,
    /// `dmem_wdata_o`
    pub wdata: u64,
}

/// Everything the DUT drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DutOutputs {
    /// Instruction port.
    pub imem: InstrRequest,
    /// Data port.
    pub dmem: DataRequest,
    /// `alert_o`: logged, never fatal.
    pub alert: bool,
}

/// Response on one port, driven by the harness.
///
/// `rdata` is 32 bits wide on the instruction port and 64 bits on the data port; the
/// instruction half is selected before it is placed here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortResponse<T> {
    /// `*_gnt_i`
    pub gnt: bool,
    /// `*_rvalid_i`
    pub rvalid: bool,
    /// `*_rdata_i`
    pub rdata: T,
}

/// Everything the harness drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DutInputs {
    /// `clk_i`
    pub clk: bool,
    /// `rst_ni`: active low.
    pub rst_n: bool,
    /// Instruction port response.
    pub imem: PortResponse<u32>,
    /// Data port response.
    pub dmem: PortResponse<u64>,
}

/// Selects the 32-bit instruction half of a storage word: address bit 2 picks the upper half.
#[inline]
pub const fn instruction_half(word: u64, addr: u64) -> u32 {
    if addr & 0x4 != 0 {
        (word >> 32) as u32
    } else {
        word as u32
    }
}
