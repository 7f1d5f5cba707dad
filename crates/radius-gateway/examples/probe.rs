//! Exercise a running gateway end to end.
//!
//! Sends an Access-Request, an accounting Start/Interim-Update/Stop sequence,
//! a CoA-Request and a Disconnect-Request, and checks every response code and
//! response authenticator. Exits non-zero on the first mismatch.
//!
//! ```text
//! cargo run -p radius-gateway --example probe -- --host 127.0.0.1
//! ```

use clap::Parser;
use radius_proto::auth::{
    calculate_request_authenticator, encrypt_user_password, generate_request_authenticator,
    verify_response_authenticator,
};
use radius_proto::{AcctStatusType, Attribute, AttributeType, Code, Packet};
use std::net::UdpSocket;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(about = "Probe a RADIUS AAA gateway")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 1812)]
    access_port: u16,

    #[arg(long, default_value_t = 1813)]
    accounting_port: u16,

    #[arg(long, default_value_t = 3799)]
    coa_port: u16,

    #[arg(long, default_value = "mysharedsecret")]
    secret: String,

    #[arg(long, default_value = "testusername")]
    username: String,

    #[arg(long, default_value = "testpassword")]
    password: String,

    /// Receive timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,
}

struct Probe {
    args: Args,
    next_id: u8,
}

impl Probe {
    fn exchange(
        &mut self,
        port: u16,
        packet: &Packet,
        expected: Code,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect((self.args.host.as_str(), port))?;
        socket.set_read_timeout(Some(Duration::from_secs(self.args.timeout)))?;

        let request_data = packet.encode()?;
        socket.send(&request_data)?;

        let mut buffer = vec![0u8; Packet::MAX_PACKET_SIZE];
        let len = socket.recv(&mut buffer)?;
        let response = Packet::decode(&buffer[..len])?;

        if response.identifier != packet.identifier {
            return Err(format!(
                "identifier mismatch: sent {}, got {}",
                packet.identifier, response.identifier
            )
            .into());
        }
        if !verify_response_authenticator(
            &response,
            &packet.authenticator,
            self.args.secret.as_bytes(),
        ) {
            return Err("response authenticator does not verify".into());
        }
        if response.code != expected {
            return Err(format!("expected {}, got {}", expected, response.code).into());
        }

        println!("  {} -> {}", packet.code, response.code);
        Ok(())
    }

    fn identifier(&mut self) -> u8 {
        self.next_id = self.next_id.wrapping_add(1);
        self.next_id
    }

    fn access_request(&mut self) -> Result<Packet, Box<dyn std::error::Error>> {
        let request_auth = generate_request_authenticator();
        let mut packet = Packet::new(Code::AccessRequest, self.identifier(), request_auth);
        packet.add_attribute(Attribute::string(
            AttributeType::UserName as u8,
            self.args.username.as_str(),
        )?);
        let hidden = encrypt_user_password(
            &self.args.password,
            self.args.secret.as_bytes(),
            &request_auth,
        )?;
        packet.add_attribute(Attribute::new(AttributeType::UserPassword as u8, hidden)?);
        packet.add_attribute(Attribute::ipv4(
            AttributeType::NasIpAddress as u8,
            [127, 0, 0, 1],
        )?);
        packet.add_attribute(Attribute::integer(AttributeType::NasPort as u8, 0)?);
        Ok(packet)
    }

    fn signed_request(
        &mut self,
        code: Code,
        attributes: Vec<Attribute>,
    ) -> Result<Packet, Box<dyn std::error::Error>> {
        let mut packet = Packet::new(code, self.identifier(), [0u8; 16]);
        packet.add_attribute(Attribute::string(
            AttributeType::UserName as u8,
            self.args.username.as_str(),
        )?);
        for attr in attributes {
            packet.add_attribute(attr);
        }
        packet.authenticator = calculate_request_authenticator(&packet, self.args.secret.as_bytes())?;
        Ok(packet)
    }

    fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        println!("Access ({}:{})", self.args.host, self.args.access_port);
        let packet = self.access_request()?;
        self.exchange(self.args.access_port, &packet, Code::AccessAccept)?;

        println!("Accounting ({}:{})", self.args.host, self.args.accounting_port);
        let session_id = format!("probe-{}", process::id());
        for status in [
            AcctStatusType::Start,
            AcctStatusType::InterimUpdate,
            AcctStatusType::Stop,
        ] {
            let mut attributes = vec![
                Attribute::integer(AttributeType::AcctStatusType as u8, status.as_u32())?,
                Attribute::string(AttributeType::AcctSessionId as u8, session_id.as_str())?,
            ];
            if status == AcctStatusType::Stop {
                attributes.push(Attribute::integer(AttributeType::AcctSessionTime as u8, 60)?);
            }
            let packet = self.signed_request(Code::AccountingRequest, attributes)?;
            self.exchange(self.args.accounting_port, &packet, Code::AccountingResponse)?;
        }

        println!("CoA ({}:{})", self.args.host, self.args.coa_port);
        for (code, expected) in [
            (Code::CoaRequest, Code::CoaAck),
            (Code::DisconnectRequest, Code::DisconnectAck),
        ] {
            let attributes = vec![Attribute::string(
                AttributeType::AcctSessionId as u8,
                session_id.as_str(),
            )?];
            let packet = self.signed_request(code, attributes)?;
            self.exchange(self.args.coa_port, &packet, expected)?;
        }

        Ok(())
    }
}

fn main() {
    let mut probe = Probe {
        args: Args::parse(),
        next_id: 0,
    };

    match probe.run() {
        Ok(()) => println!("\n✓ All exchanges succeeded"),
        Err(e) => {
            eprintln!("\n✗ Probe failed: {}", e);
            process::exit(1);
        }
    }
}
