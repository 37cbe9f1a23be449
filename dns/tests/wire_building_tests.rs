use dns::{Message, Flags, Header, Question, Labels, QClass, qtype};
use dns::record::A;

use pretty_assertions::assert_eq;


#[test]
fn build_query() {
    let message = Message::query(
        0xceac,
        Flags::query(),
        Question {
            qname: Labels::encode("rfcs.io").unwrap(),
            qclass: QClass::Other(0x42),
            qtype: 0x1234,
        },
    );

    let result = vec![
        0xce, 0xac,  // transaction ID
        0x01, 0x00,  // flags (standard query)
        0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,  // counts (1, 0, 0, 0)

        // query:
        0x04, 0x72, 0x66, 0x63, 0x73, 0x02, 0x69, 0x6f, 0x00,  // qname
        0x12, 0x34,  // type
        0x00, 0x42,  // class
    ];

    assert_eq!(message.to_bytes().unwrap(), result);
}


#[test]
fn build_response_with_compressed_answer() {
    let qname = Labels::encode("dns.lookup.dog").unwrap();

    let message = Message {
        header: Header {
            id: 0x0dcd,
            flags: Flags { response: true, ..Flags::query() },
            qdcount: 1,
            ancount: 1,
            nscount: 0,
            arcount: 0,
        },
        questions: vec![
            Question { qname: qname.clone(), qclass: QClass::IN, qtype: qtype!(A) },
        ],
        answers: vec![
            dns::ResourceRecord {
                qname,
                qclass: QClass::IN,
                ttl: 933,
                record: dns::record::Record::A(A { address: std::net::Ipv4Addr::new(138, 68, 117, 94) }),
            },
        ],
        authorities: vec![],
        additionals: vec![],
    };

    let result = vec![
        0x0d, 0xcd,  // transaction ID
        0x81, 0x00,  // flags (standard query, response, no error)
        0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,  // counts (1, 1, 0, 0)

        // the query:
        0x03, 0x64, 0x6e, 0x73, 0x06, 0x6c, 0x6f, 0x6f, 0x6b, 0x75, 0x70, 0x03,
        0x64, 0x6f, 0x67, 0x00,  // "dns.lookup.dog."
        0x00, 0x01,  // type A
        0x00, 0x01,  // class IN

        // the answer: name backtracks to the question's qname at offset 12
        0xc0, 0x0c,
        0x00, 0x01,  // type A
        0x00, 0x01,  // class IN
        0x00, 0x00, 0x03, 0xa5,  // TTL (933 seconds)
        0x00, 0x04,  // record data length 4
        0x8a, 0x44, 0x75, 0x5e,  // record data (138.68.117.94)
    ];

    assert_eq!(message.to_bytes().unwrap(), result);
}
