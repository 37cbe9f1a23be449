//! A client-side DNS resolver core: the wire codec, a query multiplexer that
//! can run several outstanding queries over a single connection, and
//! UDP/TCP/DNS-over-TLS transport.
//!
//! A [`Connection`] owns one transport channel and a background thread
//! reading frames off it. Callers share the connection between threads and
//! call [`Connection::send_query`] as many times as they like; replies are
//! matched back to their query by transaction ID as they arrive.

#![warn(deprecated_in_future)]
#![warn(future_incompatible)]
#![warn(missing_copy_implementations)]
#![warn(missing_docs)]
#![warn(nonstandard_style)]
#![warn(rust_2018_compatibility)]
#![warn(rust_2018_idioms)]
#![warn(single_use_lifetimes)]
#![warn(trivial_casts, trivial_numeric_casts)]
#![warn(unused)]

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

#![deny(clippy::cast_possible_truncation)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::cast_possible_wrap)]
#![deny(clippy::cast_sign_loss)]
#![deny(unsafe_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::thread;
use std::time::Duration;

use log::*;

use dns::{Flags, Labels, Message, Opcode, QClass, Question, TypeInt};
use dns::record::{Record, A, AAAA, SRV};
use dns_transport::Channel;

mod config;
pub use self::config::ConnectionOptions;

mod error;
pub use self::error::{Error, ConfigError};

pub mod nameservers;
pub mod hints;


/// A pending query's single-shot completion slot. The reader thread and the
/// timeout thread both try to send into this; only one of them will
/// succeed, because `sync_channel(1)` holds exactly one value and the
/// receiver is read at most once.
type Completion = SyncSender<Result<Message, Error>>;


/// An open connection to one nameserver (or, for mDNS, one multicast
/// group), able to run several queries concurrently.
pub struct Connection {
    channel: Arc<dyn Channel>,
    options: ConnectionOptions,
    state: Arc<Mutex<State>>,
}

struct State {
    next_id: u16,
    in_flight: HashMap<u16, Completion>,

    /// Set once the background reader hits a transport-level failure.
    /// Every query sent afterwards fails immediately with this same error
    /// instead of touching the (known-dead) transport.
    closed: Option<dns_transport::Error>,
}

impl Connection {

    /// Wraps an already-open channel, spawning the background reader
    /// thread that will dispatch replies to whichever query is waiting for
    /// them.
    pub fn new(channel: Arc<dyn Channel>, options: ConnectionOptions) -> Self {
        let state = Arc::new(Mutex::new(State {
            next_id: 0,
            in_flight: HashMap::new(),
            closed: None,
        }));

        let reader_channel = Arc::clone(&channel);
        let reader_state = Arc::clone(&state);
        thread::spawn(move || reader_loop(&reader_channel, &reader_state));

        Self { channel, options, state }
    }

    /// Allocates a transaction ID that isn't already in use, scanning
    /// forward from the last one handed out and wrapping around at
    /// `u16::MAX`. Returns `Error::ResourceExhausted` if every one of the
    /// 65,536 IDs is currently in flight, or the connection's stored error
    /// if the transport has already failed.
    fn allocate_id(&self) -> Result<(u16, std::sync::mpsc::Receiver<Result<Message, Error>>), Error> {
        let mut state = self.state.lock().unwrap();

        if let Some(closed) = &state.closed {
            return Err(Error::Transport(clone_transport_error(closed)));
        }

        let start = state.next_id;
        let mut candidate = start;

        loop {
            if !state.in_flight.contains_key(&candidate) {
                break;
            }

            candidate = candidate.wrapping_add(1);
            if candidate == start {
                return Err(Error::ResourceExhausted);
            }
        }

        state.next_id = candidate.wrapping_add(1);

        let (tx, rx) = sync_channel(1);
        state.in_flight.insert(candidate, tx);
        Ok((candidate, rx))
    }

    /// Sends a single question and blocks the calling thread until a reply
    /// arrives, the connection's `ttl` elapses, or `cancel_all` is called.
    ///
    /// The completion is registered in the in-flight map *before* the
    /// request is written to the transport, so a reply that arrives before
    /// `send_frame` returns (as can happen on a fast loopback connection)
    /// is never missed.
    pub fn send_query(&self, name: &str, qtype: TypeInt, extra_flags: Option<Flags>) -> Result<Message, Error> {
        let qname = Labels::encode(name)
            .map_err(|_| Error::Config(ConfigError::InvalidName(name.to_owned())))?;

        let (id, rx) = self.allocate_id()?;

        let mut flags = default_query_flags();
        if let Some(extra) = extra_flags {
            flags.checking_disabled |= extra.checking_disabled;
            flags.authentic_data |= extra.authentic_data;
        }
        if self.options.is_multicast {
            flags.recursion_desired = false;
        }

        let question = Question { qname, qclass: QClass::IN, qtype };
        let message = Message::query(id, flags, question);

        let bytes = match message.to_bytes() {
            Ok(b) => b,
            Err(e) => {
                self.state.lock().unwrap().in_flight.remove(&id);
                return Err(Error::Transport(dns_transport::Error::Io(e)));
            }
        };

        let state = Arc::clone(&self.state);
        let ttl = self.options.ttl;
        thread::spawn(move || {
            thread::sleep(ttl);

            let completion = state.lock().unwrap().in_flight.remove(&id);
            if let Some(completion) = completion {
                let _ = completion.send(Err(Error::Timeout));
            }
        });

        if let Err(e) = self.channel.send_frame(&bytes) {
            self.state.lock().unwrap().in_flight.remove(&id);
            return Err(Error::Transport(e));
        }

        rx.recv().unwrap_or(Err(Error::Cancelled))
    }

    /// Fails every currently in-flight query with `Error::Cancelled`. Does
    /// not close the underlying channel; new queries can still be sent
    /// afterwards.
    pub fn cancel_all(&self) {
        let mut state = self.state.lock().unwrap();
        for (_id, completion) in state.in_flight.drain() {
            let _ = completion.send(Err(Error::Cancelled));
        }
    }

    /// Sends an `A` query for `name` and returns the `A` records in the
    /// answer section.
    pub fn query_a(&self, name: &str) -> Result<Vec<A>, Error> {
        let message = self.send_query(name, dns::qtype!(A), None)?;
        Ok(extract_records(&message, |r| match r { Record::A(a) => Some(*a), _ => None }))
    }

    /// Sends an `AAAA` query for `name` and returns the `AAAA` records in
    /// the answer section.
    pub fn query_aaaa(&self, name: &str) -> Result<Vec<AAAA>, Error> {
        let message = self.send_query(name, dns::qtype!(AAAA), None)?;
        Ok(extract_records(&message, |r| match r { Record::AAAA(a) => Some(*a), _ => None }))
    }

    /// Sends an `SRV` query for `name` and returns the `SRV` records in the
    /// answer section.
    pub fn query_srv(&self, name: &str) -> Result<Vec<SRV>, Error> {
        let message = self.send_query(name, dns::qtype!(SRV), None)?;
        Ok(extract_records(&message, |r| match r { Record::SRV(s) => Some(s.clone()), _ => None }))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn default_query_flags() -> Flags {
    Flags {
        response: false,
        opcode: Opcode::Query,
        authoritative: false,
        truncated: false,
        recursion_desired: true,
        recursion_available: false,
        authentic_data: false,
        checking_disabled: false,
        error_code: None,
    }
}

fn extract_records<T>(message: &Message, f: impl Fn(&Record) -> Option<T>) -> Vec<T> {
    message.answers.iter().filter_map(|rr| f(&rr.record)).collect()
}

/// The background thread body: reads frames off the channel forever,
/// dispatching each to whichever query's transaction ID it matches.
/// A channel failure is fatal to every query still waiting, since there is
/// no way to know which of them the dead connection owed a reply to.
fn reader_loop(channel: &Arc<dyn Channel>, state: &Arc<Mutex<State>>) {
    loop {
        match channel.recv_frame() {
            Ok(bytes) => on_receive(&bytes, state),
            Err(e) => {
                on_transport_error(e, state);
                return;
            }
        }
    }
}

fn on_receive(bytes: &[u8], state: &Arc<Mutex<State>>) {
    let (id, result) = match Message::from_bytes(bytes) {
        Ok(message) if !message.header.flags.response => {
            debug!("Discarding non-response message with id {}", message.header.id);
            return;
        }
        Ok(message) => {
            if log_enabled!(log::Level::Trace) {
                let names: Vec<_> = message.answers.iter().map(|rr| rr.record.type_name()).collect();
                trace!("Received {} answer(s) for id {}: {:?}", names.len(), message.header.id, names);
            }
            (message.header.id, Ok(message))
        }
        Err(e) => {
            match e.header {
                Some(header) => (header.id, Err(Error::Message { header, inner: e.inner })),
                None => {
                    warn!("Discarding reply with unparseable header: {:?}", e.inner);
                    return;
                }
            }
        }
    };

    let completion = state.lock().unwrap().in_flight.remove(&id);
    match completion {
        Some(completion) => {
            let _ = completion.send(result);
        }
        None => {
            debug!("Discarding reply for unknown or already-completed transaction {}", id);
        }
    }
}

fn on_transport_error(e: dns_transport::Error, state: &Arc<Mutex<State>>) {
    error!("Transport failed, failing all in-flight queries: {}", e);

    let mut state = state.lock().unwrap();
    for (_id, completion) in state.in_flight.drain() {
        let _ = completion.send(Err(Error::Transport(clone_transport_error(&e))));
    }
    state.closed = Some(e);
}

/// `dns_transport::Error` can't derive `Clone` because some of its variants
/// wrap non-`Clone` TLS library error types, so the fan-out to every waiting
/// query re-describes the failure as plain I/O instead of cloning it.
fn clone_transport_error(e: &dns_transport::Error) -> dns_transport::Error {
    dns_transport::Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}


#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use pretty_assertions::assert_eq;

    struct LoopbackChannel {
        sent: Mutex<Vec<Vec<u8>>>,
        replies: Mutex<std::collections::VecDeque<Vec<u8>>>,
        recv_calls: AtomicUsize,
    }

    impl Channel for LoopbackChannel {
        fn send_frame(&self, bytes: &[u8]) -> Result<(), dns_transport::Error> {
            self.sent.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }

        fn recv_frame(&self) -> Result<Vec<u8>, dns_transport::Error> {
            self.recv_calls.fetch_add(1, Ordering::SeqCst);
            loop {
                if let Some(reply) = self.replies.lock().unwrap().pop_front() {
                    return Ok(reply);
                }
                thread::sleep(Duration::from_millis(5));
            }
        }
    }

    fn answer_for(id: u16) -> Vec<u8> {
        let qname = Labels::encode("example.com.").unwrap();

        let message = Message {
            header: dns::Header {
                id,
                flags: Flags { response: true, ..default_query_flags() },
                qdcount: 1,
                ancount: 1,
                nscount: 0,
                arcount: 0,
            },
            questions: vec![Question { qname: qname.clone(), qclass: QClass::IN, qtype: dns::qtype!(A) }],
            answers: vec![dns::ResourceRecord {
                qname,
                qclass: QClass::IN,
                ttl: 300,
                record: Record::A(A { address: std::net::Ipv4Addr::new(93, 184, 216, 34) }),
            }],
            authorities: vec![],
            additionals: vec![],
        };

        message.to_bytes().unwrap()
    }

    #[test]
    fn query_round_trips_through_a_loopback_channel() {
        let mut replies = std::collections::VecDeque::new();
        replies.push_back(answer_for(0));

        let channel: Arc<dyn Channel> = Arc::new(LoopbackChannel {
            sent: Mutex::new(Vec::new()),
            replies: Mutex::new(replies),
            recv_calls: AtomicUsize::new(0),
        });

        let conn = Connection::new(channel, ConnectionOptions::default());

        let records = conn.query_a("example.com.").unwrap();
        assert_eq!(records, vec![A { address: std::net::Ipv4Addr::new(93, 184, 216, 34) }]);
    }

    #[test]
    fn cancel_all_fails_every_in_flight_query() {
        let state = Arc::new(Mutex::new(State { next_id: 0, in_flight: HashMap::new(), closed: None }));
        let (tx1, rx1) = sync_channel(1);
        let (tx2, rx2) = sync_channel(1);
        state.lock().unwrap().in_flight.insert(1, tx1);
        state.lock().unwrap().in_flight.insert(2, tx2);

        let mut guard = state.lock().unwrap();
        for (_id, completion) in guard.in_flight.drain() {
            let _ = completion.send(Err(Error::Cancelled));
        }
        drop(guard);

        assert!(matches!(rx1.recv().unwrap(), Err(Error::Cancelled)));
        assert!(matches!(rx2.recv().unwrap(), Err(Error::Cancelled)));
    }

    struct DeadChannel {
        send_calls: AtomicUsize,
    }

    impl Channel for DeadChannel {
        fn send_frame(&self, _bytes: &[u8]) -> Result<(), dns_transport::Error> {
            self.send_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn recv_frame(&self) -> Result<Vec<u8>, dns_transport::Error> {
            Err(dns_transport::Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "connection reset")))
        }
    }

    #[test]
    fn send_query_fails_fast_after_transport_error() {
        let channel = Arc::new(DeadChannel { send_calls: AtomicUsize::new(0) });
        let dyn_channel: Arc<dyn Channel> = Arc::clone(&channel);
        let conn = Connection::new(dyn_channel, ConnectionOptions::default());

        for _ in 0 .. 100 {
            if conn.state.lock().unwrap().closed.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert!(conn.state.lock().unwrap().closed.is_some(), "reader thread never recorded the transport failure");

        let result = conn.query_a("example.com.");
        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(channel.send_calls.load(Ordering::SeqCst), 0, "send_query must not touch a channel already known to be dead");
    }

    #[test]
    fn allocate_id_skips_ids_already_in_flight() {
        let channel: Arc<dyn Channel> = Arc::new(LoopbackChannel {
            sent: Mutex::new(Vec::new()),
            replies: Mutex::new(std::collections::VecDeque::new()),
            recv_calls: AtomicUsize::new(0),
        });
        let conn = Connection::new(channel, ConnectionOptions::default());

        conn.state.lock().unwrap().next_id = 5;
        conn.state.lock().unwrap().in_flight.insert(5, sync_channel(1).0);
        conn.state.lock().unwrap().in_flight.insert(6, sync_channel(1).0);

        let (id, ..) = conn.allocate_id().unwrap();
        assert_eq!(id, 7);
    }

    #[test]
    fn on_receive_discards_replies_for_unknown_ids() {
        let state = Arc::new(Mutex::new(State { next_id: 0, in_flight: HashMap::new(), closed: None }));
        let bytes = answer_for(0xABCD);
        on_receive(&bytes, &state);
        assert!(state.lock().unwrap().in_flight.is_empty());
    }
}
