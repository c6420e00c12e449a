//! Butcher tableau of the Runge-Kutta-Fehlberg 7(8) pair.
//!
//! Thirteen stages; the 8th-order weights advance the orbit state and the
//! difference to the embedded 7th-order weights drives step-size control.
//!
//! Values from Fehlberg, E. (1968), NASA TR R-287, Table X.

/// Stage count of the pair.
pub const STAGES: usize = 13;

/// Order of the propagating solution.
pub const ORDER: u8 = 8;

/// Order of the embedded error estimate.
pub const EMBEDDED_ORDER: u8 = 7;

/// Stage nodes: stage `i` is evaluated at `t + C[i] * h`.
pub const C: [f64; STAGES] = [
    0.0,
    2.0 / 27.0,
    1.0 / 9.0,
    1.0 / 6.0,
    5.0 / 12.0,
    1.0 / 2.0,
    5.0 / 6.0,
    1.0 / 6.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0,
    0.0,
    1.0,
];

/// Stage coupling matrix, strictly lower triangular.
///
/// Stage `i` sees `y + h * sum_{j<i} A[i][j] * k[j]`.
pub const A: [[f64; STAGES - 1]; STAGES] = [
    [0.0; 12],
    [2.0 / 27.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 36.0, 1.0 / 12.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 24.0, 0.0, 1.0 / 8.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [5.0 / 12.0, 0.0, -25.0 / 16.0, 25.0 / 16.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [1.0 / 20.0, 0.0, 0.0, 1.0 / 4.0, 1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [
        -25.0 / 108.0,
        0.0,
        0.0,
        125.0 / 108.0,
        -65.0 / 27.0,
        125.0 / 54.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        31.0 / 300.0,
        0.0,
        0.0,
        0.0,
        61.0 / 225.0,
        -2.0 / 9.0,
        13.0 / 900.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        2.0,
        0.0,
        0.0,
        -53.0 / 6.0,
        704.0 / 45.0,
        -107.0 / 9.0,
        67.0 / 90.0,
        3.0,
        0.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        -91.0 / 108.0,
        0.0,
        0.0,
        23.0 / 108.0,
        -976.0 / 135.0,
        311.0 / 54.0,
        -19.0 / 60.0,
        17.0 / 6.0,
        -1.0 / 12.0,
        0.0,
        0.0,
        0.0,
    ],
    [
        2383.0 / 4100.0,
        0.0,
        0.0,
        -341.0 / 164.0,
        4496.0 / 1025.0,
        -301.0 / 82.0,
        2133.0 / 4100.0,
        45.0 / 82.0,
        45.0 / 164.0,
        18.0 / 41.0,
        0.0,
        0.0,
    ],
    [
        3.0 / 205.0,
        0.0,
        0.0,
        0.0,
        0.0,
        -6.0 / 41.0,
        -3.0 / 205.0,
        -3.0 / 41.0,
        3.0 / 41.0,
        6.0 / 41.0,
        0.0,
        0.0,
    ],
    [
        -1777.0 / 4100.0,
        0.0,
        0.0,
        -341.0 / 164.0,
        4496.0 / 1025.0,
        -289.0 / 82.0,
        2193.0 / 4100.0,
        51.0 / 82.0,
        33.0 / 164.0,
        12.0 / 41.0,
        0.0,
        1.0,
    ],
];

/// Weights of the 8th-order solution. Stages 11 and 12 only feed the error
/// estimate.
pub const B: [f64; STAGES] = [
    41.0 / 840.0,
    0.0,
    0.0,
    0.0,
    0.0,
    34.0 / 105.0,
    9.0 / 35.0,
    9.0 / 35.0,
    9.0 / 280.0,
    9.0 / 280.0,
    41.0 / 840.0,
    0.0,
    0.0,
];

/// Local truncation error weights, `B - B_hat`.
///
/// The embedded 7th-order solution only differs from [`B`] in the first and
/// last two stages, so the estimate collapses to
/// `(41/840) * h * (k0 + k10 - k11 - k12)`.
pub const B_ERR: [f64; STAGES] = [
    41.0 / 840.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    0.0,
    41.0 / 840.0,
    -41.0 / 840.0,
    -41.0 / 840.0,
];
