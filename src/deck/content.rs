//! Slide content of the bundled conference deck

use super::{Deck, Slide};

/// "Advancements in VLIW DSP Architectures" conference deck
///
/// A title slide followed by nine bullet slides.
pub fn vliw_dsp_deck() -> Deck {
    let mut deck = Deck::new(Slide::title(
        [
            "Advancements in VLIW DSP Architectures:",
            "Optimizing Design and Enhancing Security",
        ],
        [
            "Paul Sebastien",
            "Transilvania University of Brasov",
            "[Conference Name], June 2025",
        ],
    ));

    deck.push(Slide::content(
        "Introduction",
        [
            "VLIW DSPs: Critical for embedded systems (smartphones, IoT, 5G)",
            "Survey synthesizes advancements in design and security",
            "Objective: Optimize performance, power, and security",
            "Why it matters: Balances flexibility and efficiency",
            "Comprehensive analysis for academics and practitioners",
        ],
    ));
    deck.push(Slide::content(
        "What Are VLIW DSPs?",
        [
            "Leverage instruction-level parallelism (ILP) via static scheduling",
            "Multiple sub-instructions per VLIW (e.g., SWIFT: 4 sub-instructions)",
            "Features: SIMD datapaths, multi-banked memory, simple hardware",
            "Evolution: From TMS320C6x (1990s) to PACDSP, SWIFT",
            "[Placeholder: Diagram of VLIW architecture]",
        ],
    ));
    deck.push(Slide::content(
        "Architectural Advancements",
        [
            "Compressed Instruction Sets: RVC-VOI reduces code size by 25%",
            "Distributed Registers: PACDSP cuts latency by 46.9%",
            "SIMD & Memory: SWIFT\u{2019}s 4 datapaths for communication",
            "Scalable Designs: PACDSP (0.08 mW/MIPS), SWIFT (SoC)",
            "[Placeholder: Chart comparing code size/latency]",
        ],
    ));
    deck.push(Slide::content(
        "Performance Optimization",
        [
            "Compiler: TMS320C6416T -O3 cuts execution by 96.2%",
            "Delay Slot Scheduling: SuperV-DSP boosts speed by 63%",
            "Hand-Coded Assembly: H.263 encoder 61x faster",
            "On-chip SRAM placement: 29x speedup",
            "[Placeholder: Bar graph of performance gains]",
        ],
    ));
    deck.push(Slide::content(
        "Power Efficiency",
        [
            "DVFS & Power Gating: PACDSP at 46.60 mW (230 MHz)",
            "Configurable Memory: Saves 25% energy",
            "Synthesis Analysis: 20% energy reduction",
            "Clock Gating: 15% power savings",
            "Trade-off: -O3 increases power by 24.4%",
            "[Placeholder: Power vs. Performance graph]",
        ],
    ));
    deck.push(Slide::content(
        "Security Enhancements",
        [
            "Secure Inline Assembly: LLVM-based, prevents code injection",
            "Functional Verification: 40% faster bug detection",
            "Limitations: No defenses for side-channel attacks",
            "Need for secure boot, memory encryption",
            "[Placeholder: Security architecture diagram]",
        ],
    ));
    deck.push(Slide::content(
        "Applications",
        [
            "Multimedia: TMS320C6700 H.263 encoder (61x speedup)",
            "Communications: SWIFT for IEEE 802.11, 4G",
            "Quantum Simulation: Elbrus reduces latency by 40%",
            "IoT: RVC-VOI\u{2019}s 25% code reduction for sensors",
            "[Placeholder: Application domain icons]",
        ],
    ));
    deck.push(Slide::content(
        "Future Directions",
        [
            "Security: Hardware-based solutions (secure boot)",
            "Applications: AI, 5G signal processing",
            "Standardization: Platform-agnostic optimizations",
            "Verification: Scalable test generators, simulators",
            "[Placeholder: Roadmap timeline]",
        ],
    ));
    deck.push(Slide::content(
        "Conclusion & Q&A",
        [
            "VLIW DSPs: High performance, low power, flexible",
            "Advancements in architecture, optimization, security",
            "Applications: Multimedia, IoT, quantum simulation",
            "Future: Address security, explore AI/5G, standardize",
            "Questions? Thank you!",
            "References: Hsieh et al. [1], Ren et al. [2], Banerjee et al. [3]",
        ],
    ));

    deck
}
