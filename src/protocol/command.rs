//! Commands of the sign protocol.
//!
//! Each command renders to a body. Most bodies are sent inside an address
//! frame; batch brackets and address assignment are sent standalone.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::protocol::frame::{self, ACK};
use crate::protocol::graphic::{BlockId, GraphicId, PAYLOAD_LEN};
use crate::types::{Brightness, LineId, PageId, ScheduleId};

/// Highest address the address-assignment command can express.
pub const MAX_ADDRESS: u8 = 99;

/// Format of the clock-setting body: year, `0`, weekday, month, day, time.
pub const CLOCK_FORMAT: &str = "%y0%w%m%d%H%M%S";

/// A command sent to the sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a page on a line. `packet` is the page packet.
    UpdatePage {
        line: LineId,
        page: PageId,
        packet: Vec<u8>,
    },
    /// Store a schedule. `packet` is the schedule packet.
    UpsertSchedule { id: ScheduleId, packet: String },
    /// Delete a schedule.
    DeleteSchedule(ScheduleId),
    /// Wipe all pages and schedules.
    Reset,
    /// Set the real-time clock.
    SetClock(NaiveDateTime),
    /// Set the display brightness.
    Brightness(Brightness),
    /// Set the page shown when no schedule runs.
    DefaultRunPage(PageId),
    /// Suspend redraw while a batch is loaded.
    BeginBatch,
    /// Resume redraw after a batch.
    EndBatch,
    /// Program one block of a graphic slot.
    ProgramGraphic {
        graphic: GraphicId,
        block: BlockId,
        payload: [u8; PAYLOAD_LEN],
    },
    /// Assign a new address to the sign.
    SetAddress(u8),
}

impl Command {
    /// Creates an address-assignment command.
    pub fn set_address(address: u8) -> Result<Self> {
        if address > MAX_ADDRESS {
            return Err(Error::InvalidAddress(address));
        }
        Ok(Self::SetAddress(address))
    }

    /// Renders the command body.
    #[must_use]
    pub fn body(&self) -> Bytes {
        let mut buf = BytesMut::new();
        match self {
            Self::UpdatePage { line, page, packet } => {
                buf.put_slice(format!("<L{line}><P{page}>").as_bytes());
                buf.put_slice(packet);
            }
            Self::UpsertSchedule { id, packet } => {
                buf.put_slice(format!("<T{id}>{packet}").as_bytes());
            }
            Self::DeleteSchedule(id) => buf.put_slice(format!("<DT{id}>").as_bytes()),
            Self::Reset => buf.put_slice(b"<D*>"),
            Self::SetClock(now) => {
                buf.put_slice(format!("<SC>{}", now.format(CLOCK_FORMAT)).as_bytes());
            }
            Self::Brightness(level) => buf.put_slice(format!("<B{}>", level.code()).as_bytes()),
            Self::DefaultRunPage(page) => buf.put_slice(format!("<RP{page}>").as_bytes()),
            Self::BeginBatch => buf.put_slice(b"<BE>"),
            Self::EndBatch => buf.put_slice(b"<BF>"),
            Self::ProgramGraphic {
                graphic,
                block,
                payload,
            } => {
                buf.put_slice(
                    format!("<G{}{}>", graphic.as_char(), block.as_char()).as_bytes(),
                );
                buf.put_slice(payload);
            }
            Self::SetAddress(address) => {
                buf.put_slice(format!("<ID><{address:02}><E>").as_bytes());
            }
        }
        buf.freeze()
    }

    /// Returns true if the command travels inside an address frame.
    #[must_use]
    pub const fn is_framed(&self) -> bool {
        !matches!(self, Self::BeginBatch | Self::EndBatch | Self::SetAddress(_))
    }

    /// Returns the reply that confirms the command, if one is checked.
    #[must_use]
    pub fn expected_response(&self) -> Option<String> {
        match self {
            Self::BeginBatch | Self::EndBatch => None,
            Self::SetAddress(address) => Some(format!("{address:02}")),
            _ => Some(ACK.to_owned()),
        }
    }

    /// Encodes the command as wire bytes for the given sign address.
    #[must_use]
    pub fn encode(&self, address: u8) -> Bytes {
        let body = self.body();
        if self.is_framed() {
            frame::encode(address, &body)
        } else {
            frame::encode_raw(&body)
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::UpdatePage { .. } => "update page",
            Self::UpsertSchedule { .. } => "upsert schedule",
            Self::DeleteSchedule(_) => "delete schedule",
            Self::Reset => "reset",
            Self::SetClock(_) => "set clock",
            Self::Brightness(_) => "brightness",
            Self::DefaultRunPage(_) => "default run page",
            Self::BeginBatch => "begin batch",
            Self::EndBatch => "end batch",
            Self::ProgramGraphic { .. } => "program graphic",
            Self::SetAddress(_) => "set address",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::protocol::frame::checksum;

    fn framed(address: &str, body: &[u8]) -> Vec<u8> {
        [address.as_bytes(), body, &checksum(body), b"<E>"].concat()
    }

    #[test]
    fn test_update_page_body() {
        let cmd = Command::UpdatePage {
            line: LineId::new('1').unwrap(),
            page: PageId::new('A').unwrap(),
            packet: b"<FE><MQ><WA><FE>HELLO".to_vec(),
        };
        assert_eq!(cmd.body().as_ref(), b"<L1><PA><FE><MQ><WA><FE>HELLO");
        assert_eq!(
            cmd.encode(0x01).as_ref(),
            framed("<ID01>", b"<L1><PA><FE><MQ><WA><FE>HELLO").as_slice()
        );
    }

    #[test]
    fn test_schedule_bodies() {
        let id = ScheduleId::new('B').unwrap();
        let upsert = Command::UpsertSchedule {
            id,
            packet: "00010100009901010000AB".into(),
        };
        assert_eq!(upsert.body().as_ref(), b"<TB>00010100009901010000AB");
        assert_eq!(Command::DeleteSchedule(id).body().as_ref(), b"<DTB>");
    }

    #[test]
    fn test_simple_bodies() {
        assert_eq!(Command::Reset.body().as_ref(), b"<D*>");
        assert_eq!(
            Command::Brightness(Brightness::Half).body().as_ref(),
            b"<BC>"
        );
        assert_eq!(
            Command::DefaultRunPage(PageId::new('C').unwrap())
                .body()
                .as_ref(),
            b"<RPC>"
        );
    }

    #[test]
    fn test_set_clock_body() {
        // 2024-03-15 was a Friday (weekday 5).
        let now = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(9, 8, 7)
            .unwrap();
        assert_eq!(Command::SetClock(now).body().as_ref(), b"<SC>24050315090807");
    }

    #[test]
    fn test_brackets_are_unframed() {
        assert!(!Command::BeginBatch.is_framed());
        assert_eq!(Command::BeginBatch.encode(0x01).as_ref(), b"<BE>");
        assert_eq!(Command::EndBatch.encode(0x01).as_ref(), b"<BF>");
        assert_eq!(Command::BeginBatch.expected_response(), None);
    }

    #[test]
    fn test_set_address() {
        let cmd = Command::set_address(7).unwrap();
        assert_eq!(cmd.encode(0x01).as_ref(), b"<ID><07><E>");
        assert_eq!(cmd.expected_response().as_deref(), Some("07"));
        assert!(matches!(
            Command::set_address(100),
            Err(Error::InvalidAddress(100))
        ));
    }

    #[test]
    fn test_program_graphic_keeps_binary_payload() {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = 0xff;
        payload[63] = 0x80;
        let cmd = Command::ProgramGraphic {
            graphic: GraphicId::new('A').unwrap(),
            block: BlockId::new('1').unwrap(),
            payload,
        };
        let body = cmd.body();
        assert_eq!(&body[..5], b"<GA1>");
        assert_eq!(&body[5..], &payload);
        assert_eq!(cmd.encode(0x02).as_ref(), framed("<ID02>", &body).as_slice());
        assert_eq!(cmd.expected_response().as_deref(), Some(ACK));
    }
}
