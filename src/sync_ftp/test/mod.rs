
use super::*;
use crate::{Channel, FtpBuilder};
use server::{
    assert_closed_by_client, connect, spawn_server, Event, Failure, MemoryStorage, Recorder,
    GREETING,
};

use pretty_assertions::assert_eq;
use serial_test::serial;
use socket2::SockRef;
use std::io::Write;
use std::net::TcpListener;
use std::time::Instant;

const LISTING: [&str; 3] = [
    "drwxr-xr-x    2 0        0            4096 Nov 05  2018 pub",
    "-rw-r--r--    1 0        0             403 Nov 05  2018 readme.txt",
    "-rw-r--r--    1 0        0           18225 Nov 05  2018 omar.bin",
];

fn payload() -> Vec<u8> {
    (0..=255u8).cycle().take(256 * 40 + 13).collect()
}

fn accept_data(listener: &TcpListener) -> std::net::TcpStream {
    let (data, _) = listener.accept().unwrap();
    data
}

fn recorded(server: &server::MockServer) -> (FtpStream, Recorder) {
    let recorder = Recorder::default();
    let stream = FtpBuilder::new("127.0.0.1")
        .port(server.port())
        .timeout(Some(Duration::from_secs(5)))
        .console(recorder.clone())
        .connect()
        .unwrap();
    (stream, recorder)
}

#[test]
#[serial]
fn welcome_message() {
    crate::log_init();
    let server = spawn_server(|_| {});
    let stream = FtpStream::connect_timeout("127.0.0.1", server.port(), Duration::from_secs(5))
        .unwrap();
    assert_eq!(stream.get_welcome_msg().unwrap(), GREETING);
    assert!(stream.peer_addr().unwrap().ip().is_loopback());
    server.join();
}

#[test]
#[serial]
fn should_fail_connecting_to_closed_port() {
    crate::log_init();
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = FtpStream::connect("127.0.0.1", port).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
#[serial]
fn should_login_and_change_directory() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("USER test");
        server.reply("331 Please specify the password.");
        server.expect("PASS test");
        server.reply("230 Login successful.");
        server.expect("CWD /pub");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    assert_eq!(
        stream.user("test").unwrap().as_str(),
        "331 Please specify the password."
    );
    assert_eq!(stream.pass("test").unwrap().code(), Some(230));
    assert_eq!(stream.cwd("/pub").unwrap().code(), Some(250));
    server.join();
}

#[test]
#[serial]
fn should_read_features_up_to_end_marker() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("FEAT");
        server.reply("211-Features:");
        server.reply(" EPSV");
        server.reply(" PASV");
        server.reply(" UTF8");
        server.reply("211 End");
        server.expect("CWD /");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    let features: Vec<String> = stream
        .feat()
        .unwrap()
        .into_iter()
        .map(Reply::into_string)
        .collect();
    assert_eq!(
        features,
        vec!["211-Features:", " EPSV", " PASV", " UTF8", "211 End"]
    );
    // the reply to the next command is not swallowed by the feature loop
    assert_eq!(stream.cwd("/").unwrap().code(), Some(250));
    server.join();
}

#[test]
#[serial]
fn should_stop_features_when_server_hangs_up() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("FEAT");
        server.reply("211-Features:");
        server.reply(" UTF8");
    });
    let mut stream = connect(&server);
    let features = stream.feat().unwrap();
    assert_eq!(features.len(), 2);
    server.join();
}

#[test]
#[serial]
fn should_list_directory() {
    crate::log_init();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("LIST");
        // the client connects before it sends LIST
        listener.set_nonblocking(true).unwrap();
        let mut data = (0..50)
            .find_map(|_| match listener.accept() {
                Ok((data, _)) => Some(data),
                Err(_) => {
                    std::thread::sleep(Duration::from_millis(10));
                    None
                }
            })
            .expect("data connection was not opened before LIST");
        data.set_nonblocking(false).unwrap();
        server.reply("150 Here comes the directory listing.");
        for line in LISTING {
            write!(data, "{line}\r\n").unwrap();
        }
        drop(data);
        server.reply("226 Directory send OK.");
    });
    let (mut stream, recorder) = recorded(&server);
    let lines = stream.list(None).unwrap();
    assert_eq!(lines, LISTING.to_vec());
    server.join();

    let mut expected = vec![
        Event::Reply(GREETING.to_string()),
        Event::Request("PASV".to_string()),
        Event::Reply(recorder.events()[2].clone().reply_text()),
        Event::Request("LIST".to_string()),
        Event::Reply("150 Here comes the directory listing.".to_string()),
        Event::Reply("226 Directory send OK.".to_string()),
    ];
    expected.extend(LISTING.iter().map(|l| Event::Listing(l.to_string())));
    assert_eq!(recorder.events(), expected);
}

#[test]
#[serial]
fn should_read_two_replies_before_draining_listing() {
    crate::log_init();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("LIST");
        let mut data = accept_data(&listener);
        server.reply("150 Here comes the directory listing.");
        server.reply("226 Directory send OK.");
        data.write_all(b"226 this line belongs to the listing\r\n").unwrap();
        drop(data);
        server.expect("CWD pub");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    assert_eq!(
        stream.list(None).unwrap(),
        vec!["226 this line belongs to the listing"]
    );
    assert_eq!(
        stream.cwd("pub").unwrap().as_str(),
        "250 Directory successfully changed."
    );
    server.join();
}

#[test]
#[serial]
fn should_retrieve_file_byte_exact() {
    crate::log_init();
    let storage = MemoryStorage::default();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("RETR omar.bin");
        let mut data = accept_data(&listener);
        server.reply("150 Opening BINARY mode data connection for omar.bin (10253 bytes).");
        data.write_all(&payload()).unwrap();
        drop(data);
        server.reply("226 Transfer complete.");
    });
    let mut stream = connect(&server);
    let mut local = storage.clone();
    assert_eq!(
        stream.retr("omar.bin", &mut local).unwrap(),
        payload().len() as u64
    );
    assert_eq!(storage.contents("omar.bin").unwrap(), payload());
    server.join();
}

#[test]
#[serial]
fn should_not_create_file_when_unavailable() {
    crate::log_init();
    let storage = MemoryStorage::default();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("RETR missing.txt");
        let mut data = accept_data(&listener);
        server.reply("550 Failed to open file.");
        assert_closed_by_client(&mut data);
    });
    let mut stream = connect(&server);
    let mut local = storage.clone();
    match stream.retr("missing.txt", &mut local) {
        Err(FtpError::NotFoundError(reply)) => {
            assert_eq!(reply.as_str(), "550 Failed to open file.")
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(storage.created().is_empty());
    server.join();
}

#[test]
#[serial]
fn should_drain_transfer_when_local_file_cannot_be_created() {
    crate::log_init();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("RETR omar.bin");
        let mut data = accept_data(&listener);
        server.reply("150 Opening BINARY mode data connection.");
        data.write_all(&payload()).unwrap();
        drop(data);
        server.reply("226 Transfer complete.");
        server.expect("CWD /");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    let mut storage = MemoryStorage::failing(Failure::OnCreate);
    let err = stream.retr("omar.bin", &mut storage).unwrap_err();
    assert!(matches!(err, FtpError::LocalResourceError { .. }));
    assert!(!err.is_fatal());
    assert!(storage.created().is_empty());
    assert_eq!(stream.cwd("/").unwrap().code(), Some(250));
    server.join();
}

#[test]
#[serial]
fn should_drain_transfer_when_local_write_fails() {
    crate::log_init();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("RETR omar.bin");
        let mut data = accept_data(&listener);
        server.reply("150 Opening BINARY mode data connection.");
        data.write_all(&payload()).unwrap();
        drop(data);
        server.reply("226 Transfer complete.");
        server.expect("CWD /");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    let mut storage = MemoryStorage::failing(Failure::OnWrite);
    assert!(matches!(
        stream.retr("omar.bin", &mut storage),
        Err(FtpError::LocalResourceError { .. })
    ));
    assert_eq!(stream.cwd("/").unwrap().code(), Some(250));
    server.join();
}

#[test]
#[serial]
fn should_read_final_reply_when_data_connection_resets() {
    crate::log_init();
    let storage = MemoryStorage::default();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("RETR omar.bin");
        let data = accept_data(&listener);
        server.reply("150 Opening BINARY mode data connection for omar.bin (10253 bytes).");
        SockRef::from(&data).set_linger(Some(Duration::ZERO)).unwrap();
        drop(data);
        server.reply("426 Connection closed; transfer aborted.");
        server.expect("CWD /");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    let mut local = storage.clone();
    let err = stream.retr("omar.bin", &mut local).unwrap_err();
    assert!(matches!(
        err,
        FtpError::IoError {
            channel: Channel::Data,
            ..
        }
    ));
    assert!(!err.is_fatal());
    assert_eq!(
        stream.cwd("/").unwrap().as_str(),
        "250 Directory successfully changed."
    );
    assert_eq!(server.join(), vec!["PASV", "RETR omar.bin", "CWD /"]);
}

#[test]
#[serial]
fn should_reject_malformed_passive_reply() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("PASV");
        server.reply("227 Entering Passive Mode");
        server.expect("CWD /");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    let err = stream.list(None).unwrap_err();
    assert!(matches!(err, FtpError::ProtocolError(_)));
    assert!(!err.is_fatal());
    assert_eq!(stream.cwd("/").unwrap().code(), Some(250));
    assert_eq!(server.join(), vec!["PASV", "CWD /"]);
}

#[test]
#[serial]
fn should_abort_transfer_when_data_connection_fails() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("PASV");
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        server.reply(&format!(
            "227 Entering Passive Mode (127,0,0,1,{},{}).",
            port / 256,
            port % 256
        ));
        server.expect("CWD /");
        server.reply("250 Directory successfully changed.");
    });
    let mut stream = connect(&server);
    let mut storage = MemoryStorage::default();
    let err = stream.retr("omar.bin", &mut storage).unwrap_err();
    assert!(matches!(
        err,
        FtpError::IoError {
            channel: crate::Channel::Data,
            ..
        }
    ));
    assert_eq!(stream.cwd("/").unwrap().code(), Some(250));
    // RETR is never sent when the data connection cannot be opened
    assert_eq!(server.join(), vec!["PASV", "CWD /"]);
}

#[test]
#[serial]
fn should_open_one_data_connection_at_a_time() {
    crate::log_init();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv();
        server.expect("LIST");
        let mut first = accept_data(&listener);
        server.reply("150 Here comes the directory listing.");
        server.reply("226 Directory send OK.");
        first.write_all(b"pub\r\n").unwrap();
        first.shutdown(std::net::Shutdown::Write).unwrap();

        let listener = server.expect_pasv();
        // the previous transfer is closed before a new one is negotiated
        assert_closed_by_client(&mut first);
        server.expect("RETR readme.txt");
        let mut second = accept_data(&listener);
        server.reply("150 Opening BINARY mode data connection.");
        second.write_all(b"hello\n").unwrap();
        drop(second);
        server.reply("226 Transfer complete.");
    });
    let mut stream = connect(&server);
    let mut storage = MemoryStorage::default();
    assert_eq!(stream.list(None).unwrap(), vec!["pub"]);
    assert_eq!(stream.retr("readme.txt", &mut storage).unwrap(), 6);
    assert_eq!(storage.contents("readme.txt").unwrap(), b"hello\n");
    server.join();
}

#[test]
#[serial]
fn should_set_passive_nat_workaround() {
    crate::log_init();
    let server = spawn_server(|server| {
        let listener = server.expect_pasv_announcing([10, 0, 0, 1]);
        server.expect("LIST");
        let mut data = accept_data(&listener);
        server.reply("150 Here comes the directory listing.");
        server.reply("226 Directory send OK.");
        data.write_all(b"pub\r\n").unwrap();
    });
    let mut stream = connect(&server);
    stream.set_passive_nat_workaround(true);
    assert_eq!(stream.list(None).unwrap(), vec!["pub"]);
    server.join();
}

#[test]
#[serial]
fn should_quit() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("QUIT");
        server.reply("221 Goodbye.");
        server.expect_eof();
    });
    let stream = connect(&server);
    assert_eq!(stream.quit().unwrap().as_str(), "221 Goodbye.");
    assert_eq!(server.join(), vec!["QUIT"]);
}

#[test]
#[serial]
fn should_give_up_on_stalled_reply_after_timeout() {
    crate::log_init();
    let server = spawn_server(|server| {
        server.expect("CWD /");
        server.expect_eof();
    });
    let mut stream = FtpBuilder::new("127.0.0.1")
        .port(server.port())
        .timeout(Some(Duration::from_millis(200)))
        .connect()
        .unwrap();
    let started = Instant::now();
    let err = stream.cwd("/").unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        err,
        FtpError::IoError {
            channel: Channel::Control,
            ..
        }
    ));
    assert!(err.is_fatal());
    drop(stream);
    assert_eq!(server.join(), vec!["CWD /"]);
}

impl Event {
    fn reply_text(self) -> String {
        match self {
            Event::Reply(text) => text,
            other => panic!("not a reply: {other:?}"),
        }
    }
}
