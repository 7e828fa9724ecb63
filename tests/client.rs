use steady_redis::{Client, ClientConfig, Connection, Error, Frame};

use bytes::Bytes;
use std::net::SocketAddr;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::net::TcpListener;

/// What the scripted server does with the next command it receives.
enum Step {
    Reply(Frame),
    /// Close the connection without replying.
    Hangup,
    /// Keep the connection open but never reply.
    Stall,
}

/// Commands received, per accepted connection.
type Log = Vec<Vec<Vec<String>>>;

fn ok() -> Step {
    Step::Reply(Frame::Simple("OK".to_string()))
}

fn bulk(value: &'static str) -> Step {
    Step::Reply(Frame::Bulk(Bytes::from(value)))
}

#[test]
fn key_value_get_set() {
    let (addr, server) = start_server(vec![vec![ok(), bulk("bar")]]);
    let mut client = Client::new(config(addr));

    client.set("foo", "bar".into()).unwrap();
    let value = client.get("foo").unwrap().unwrap();
    assert_eq!(b"bar", &value[..]);

    drop(client);
    assert_eq!(
        server.join().unwrap(),
        vec![vec![strings(&["SET", "foo", "bar"]), strings(&["GET", "foo"])]]
    );
}

#[test]
fn handshake_runs_once_per_connection() {
    let (addr, server) = start_server(vec![vec![
        ok(),
        ok(),
        Step::Reply(Frame::Integer(1)),
        Step::Reply(Frame::Integer(2)),
    ]]);
    let mut client = Client::new(config(addr).password("secret").database(3));

    assert_eq!(client.incr("hits").unwrap(), 1);
    assert_eq!(client.incr("hits").unwrap(), 2);

    drop(client);
    assert_eq!(
        server.join().unwrap(),
        vec![vec![
            strings(&["AUTH", "secret"]),
            strings(&["SELECT", "3"]),
            strings(&["INCR", "hits"]),
            strings(&["INCR", "hits"]),
        ]]
    );
}

#[test]
fn dropped_connection_is_retried_once_on_a_new_one() {
    let (addr, server) = start_server(vec![
        vec![ok(), Step::Hangup],
        vec![ok(), bulk("v")],
    ]);
    let mut client = Client::new(config(addr));

    client.select(5).unwrap();
    let value = client.get("k").unwrap();
    assert_eq!(value, Some(Bytes::from("v")));
    assert_eq!(client.manager().crash_mark().count(), 1);

    drop(client);
    assert_eq!(
        server.join().unwrap(),
        vec![
            vec![strings(&["SELECT", "5"]), strings(&["GET", "k"])],
            vec![strings(&["SELECT", "5"]), strings(&["GET", "k"])],
        ]
    );
}

#[test]
fn operation_timeout_counts_as_a_crash() {
    let (addr, server) = start_server(vec![vec![Step::Stall], vec![bulk("late")]]);
    let mut client = Client::new(config(addr).operation_timeout(Duration::from_millis(100)));

    assert_eq!(client.get("k").unwrap(), Some(Bytes::from("late")));
    assert_eq!(client.manager().crash_mark().count(), 1);

    drop(client);
    assert_eq!(server.join().unwrap().len(), 2);
}

#[test]
fn zero_timeouts_set_on_the_fields_wait_for_replies() {
    let (addr, server) = start_server(vec![vec![ok()]]);
    let mut config = config(addr);
    config.connection_timeout = Some(Duration::ZERO);
    config.operation_timeout = Some(Duration::ZERO);
    let mut client = Client::new(config);

    assert_eq!(client.set("k", "v".into()), Ok(()));
    assert_eq!(client.manager().crash_mark().count(), 0);

    drop(client);
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn error_reply_is_not_retried() {
    let (addr, server) = start_server(vec![vec![
        Step::Reply(Frame::Error("ERR value is not an integer".to_string())),
        ok(),
    ]]);
    let mut client = Client::new(config(addr));

    assert_eq!(
        client.incr("name"),
        Err(Error::Rejected("ERR value is not an integer".to_string()))
    );
    assert!(client.is_connected());
    client.set("name", "ann".into()).unwrap();

    drop(client);
    let log = server.join().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].len(), 2);
}

#[test]
fn refused_connection_backs_off() {
    // Grab a free port, then close it so connecting is refused.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mut client = Client::new(config(addr).reconnection_interval(Duration::from_secs(60)));

    assert_eq!(client.get("k"), Err(Error::Unavailable));
    assert_eq!(client.manager().crash_mark().count(), 1);

    // Inside the window nothing is attempted.
    assert_eq!(client.get("k"), Err(Error::Unavailable));
    assert_eq!(client.manager().crash_mark().count(), 1);

    client.set_reconnection_interval(Duration::ZERO);
    thread::sleep(Duration::from_millis(5));
    assert_eq!(client.get("k"), Err(Error::Unavailable));
    assert_eq!(client.manager().crash_mark().count(), 2);
}

fn config(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(addr.ip().to_string(), addr.port())
        .connection_timeout(Duration::from_secs(5))
        .operation_timeout(Duration::from_secs(5))
}

fn strings(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

/// Serve one connection per entry of `script`, in order, and return what
/// each connection received once the script is played out.
fn start_server(script: Vec<Vec<Step>>) -> (SocketAddr, JoinHandle<Log>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let listener = TcpListener::from_std(listener).unwrap();
            let mut log = Vec::new();
            let mut stalled = Vec::new();

            for steps in script {
                let (socket, _) = listener.accept().await.unwrap();
                let mut connection = Connection::new(socket);
                let mut received = Vec::new();

                for step in steps {
                    let frame = match connection.read_frame().await.unwrap() {
                        Some(frame) => frame,
                        None => break,
                    };
                    received.push(command_parts(frame));

                    match step {
                        Step::Reply(reply) => connection.write_frame(&reply).await.unwrap(),
                        Step::Hangup => break,
                        Step::Stall => {
                            stalled.push(connection);
                            break;
                        }
                    }
                }

                log.push(received);
            }

            drop(stalled);
            log
        })
    });

    (addr, handle)
}

fn command_parts(frame: Frame) -> Vec<String> {
    match frame {
        Frame::Array(parts) => parts
            .into_iter()
            .map(|part| match part {
                Frame::Bulk(data) => String::from_utf8(data.to_vec()).unwrap(),
                other => panic!("unexpected argument {:?}", other),
            })
            .collect(),
        other => panic!("unexpected command {:?}", other),
    }
}
