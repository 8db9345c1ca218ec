use podi::host::{
    Bank, CancelToken, Command, Podi, ResetLine, RunControl, SplitImage,
    TickLimit, VirtualResetLine,
};
use podi::link::QueueTransport;
use podi::sqi::SqiClient;
use std::io::{self, Read};

//===========================================================================//

type TestPodi = Podi<QueueTransport, VirtualResetLine>;

fn new_podi() -> TestPodi {
    Podi::new(
        QueueTransport::new(),
        QueueTransport::new(),
        VirtualResetLine::new(),
    )
}

fn serve(podi: &mut TestPodi, input: &[u8]) -> String {
    let mut output = Vec::new();
    podi.serve(input, &mut output, TickLimit::new(100)).unwrap();
    String::from_utf8(output).unwrap()
}

/// A host link that goes quiet (times out) after its data runs out, rather
/// than closing.
struct StallingLink<'a> {
    data: &'a [u8],
}

impl Read for StallingLink<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() {
            return Err(io::Error::from(io::ErrorKind::TimedOut));
        }
        let len = buf.len().min(self.data.len());
        buf[..len].copy_from_slice(&self.data[..len]);
        self.data = &self.data[len..];
        Ok(len)
    }
}

/// A host link that times out before every byte, then closes.
struct FlakyLink<'a> {
    data: &'a [u8],
    stalled: bool,
}

impl Read for FlakyLink<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.data.is_empty() || buf.is_empty() {
            return Ok(0);
        }
        if !self.stalled {
            self.stalled = true;
            return Err(io::Error::from(io::ErrorKind::WouldBlock));
        }
        self.stalled = false;
        buf[0] = self.data[0];
        self.data = &self.data[1..];
        Ok(1)
    }
}

//===========================================================================//

#[test]
fn flash_then_access_over_sqi() {
    let mut podi = new_podi();
    let output = serve(
        &mut podi,
        &[0x01, 0x03, 0x00, 0x01, 0x02, 0x03, 0x10, 0x20, 0x30],
    );
    assert!(output.contains("Flashing 3 bytes to each memory.\n"));
    assert!(output.ends_with("Flashing complete.\n=== DONE ===\n"));

    let client = SqiClient::new();
    let lo = podi.memory_mut(Bank::Lo);
    assert_eq!(client.read(lo, 1, 1), Ok(vec![0x02]));
    let hi = podi.memory_mut(Bank::Hi);
    assert_eq!(client.read(hi, 0, 3), Ok(vec![0x10, 0x20, 0x30]));
    assert_eq!(client.write(hi, 0, &[0xff]), Ok(()));
    assert_eq!(client.read(hi, 0, 1), Ok(vec![0xff]));
    // The low memory is untouched by the write to the high memory.
    assert_eq!(client.read(podi.memory_mut(Bank::Lo), 0, 1), Ok(vec![0x01]));
}

#[test]
fn session_of_commands() {
    let mut podi = new_podi();
    let mut input = vec![Command::Ping.to_byte(), 0x42];
    let image = SplitImage::from_binary(&[0x12, 0x34]).unwrap();
    input.extend(image.flash_command());
    input.push(Command::Run.to_byte());
    let output = serve(&mut podi, &input);
    assert_eq!(
        output,
        "Run command: PING (0x00)\n\
         Ping!\n\
         === DONE ===\n\
         ERROR: Invalid command: 0x42\n\
         Run command: FLASH (0x01)\n\
         Flashing 1 bytes to each memory.\n\
         Flashing complete.\n\
         === DONE ===\n\
         Run command: RUN (0x02)\n\
         === DONE ===\n"
    );
    assert_eq!(podi.memory(Bank::Lo).peek(0), 0x24);
    assert_eq!(podi.memory(Bank::Hi).peek(0), 0x13);
    assert_eq!(podi.reset_line().release_count(), 1);
    assert!(podi.reset_line().is_held());
}

#[test]
fn stalled_flash_reports_offset_and_keeps_partial_data() {
    let mut podi = new_podi();
    let mut output = Vec::new();
    let link = StallingLink { data: &[0x04, 0x00, 0x0a, 0x0b] };
    podi.flash(link, &mut output).unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "Flashing 4 bytes to each memory.\n\
         ERROR: Memory 0: byte 2/4 timed out.\n"
    );
    assert_eq!(podi.memory(Bank::Lo).peek(0), 0x0a);
    assert_eq!(podi.memory(Bank::Lo).peek(1), 0x0b);
    assert_eq!(podi.memory(Bank::Lo).peek(2), 0x00);
}

#[test]
fn serve_waits_through_timeouts_between_commands() {
    let mut podi = new_podi();
    let link = FlakyLink { data: &[0x00, 0x00], stalled: false };
    let mut output = Vec::new();
    podi.serve(link, &mut output, TickLimit::new(1)).unwrap();
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "Run command: PING (0x00)\nPing!\n=== DONE ===\n\
         Run command: PING (0x00)\nPing!\n=== DONE ===\n"
    );
}

#[test]
fn run_until_cancelled() {
    let mut podi = new_podi();
    {
        let hi = podi.memory_mut(Bank::Hi).transport_mut();
        hi.select();
        for byte in [0x02, 0x12, 0x34, 0x77] {
            hi.push_inbound(byte);
        }
    }
    let token = CancelToken::new();
    let mut rounds = 0;
    let mut control =
        CountingControl { token: token.clone(), rounds: &mut rounds };
    podi.run(&mut control);
    assert!(token.is_cancelled());
    assert_eq!(rounds, 10);
    assert_eq!(podi.memory(Bank::Hi).peek(0x1234), 0x77);
    assert!(podi.reset_line().is_held());
}

/// Cancels its token from "outside" after ten rounds.
struct CountingControl<'a> {
    token: CancelToken,
    rounds: &'a mut u32,
}

impl RunControl for CountingControl<'_> {
    fn keep_running(&mut self) -> bool {
        if *self.rounds == 10 {
            self.token.cancel();
        }
        if self.token.is_cancelled() {
            return false;
        }
        *self.rounds += 1;
        true
    }
}

//===========================================================================//
